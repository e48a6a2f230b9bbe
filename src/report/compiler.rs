//! Report compiler: `ReportRequest` + catalog → `CompiledQuery`.
//!
//! Compilation never touches the database. Every reference is checked
//! against the catalog snapshot, so a request that compiles only fails at
//! execution time for runtime reasons.

use std::fmt;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::config::ReportSettings;
use crate::sql::{
    avg, col, count, count_distinct, count_star, max, min, sum, BoundValue, Dialect, Expr,
    ExprExt, OrderByExpr, Query, SelectExpr, SortDir, TableRef,
};

use super::error::{CompileError, CompileResult};
use super::functions;
use super::operators::FilterOperator;
use super::request::{AggregateSpec, FilterSpec, JoinSpec, OrderBySpec, ReportRequest};
use super::scope::{AliasAllocator, ResolvedColumn, TableScope};

// ============================================================================
// Output types
// ============================================================================

/// One output column of a compiled report.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Output key in result rows.
    pub alias: String,
    pub expr: Expr,
}

/// Non-fatal findings recorded while compiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompileDiagnostic {
    /// A scalar function outside the allow-list was ignored.
    UnknownFunction { function: String, attribute: String },
    /// The requested limit exceeded the configured maximum.
    LimitClamped { requested: u64, applied: u64 },
}

impl fmt::Display for CompileDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileDiagnostic::UnknownFunction {
                function,
                attribute,
            } => write!(
                f,
                "unknown function '{}' on '{}' was ignored",
                function, attribute
            ),
            CompileDiagnostic::LimitClamped { requested, applied } => {
                write!(f, "limit {} reduced to {}", requested, applied)
            }
        }
    }
}

/// A fully resolved report query. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub projections: Vec<Projection>,
    pub query: Query,
    pub diagnostics: Vec<CompileDiagnostic>,
}

impl CompiledQuery {
    /// Output keys, in projection order.
    pub fn aliases(&self) -> Vec<String> {
        self.projections.iter().map(|p| p.alias.clone()).collect()
    }

    /// Literal-inlined SQL for display.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.query.to_sql(dialect)
    }

    /// Placeholder SQL plus the values to bind, for execution.
    pub fn to_parameterized(&self, dialect: Dialect) -> (String, Vec<BoundValue>) {
        self.query.to_parameterized(dialect)
    }
}

// ============================================================================
// Compiler
// ============================================================================

/// Limits applied to every compiled report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Used when a request sets no limit.
    pub default_limit: u64,
    /// Optional operator cap. `None` runs every valid limit as requested.
    pub max_limit: Option<u64>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            default_limit: 1000,
            max_limit: None,
        }
    }
}

impl From<&ReportSettings> for CompileOptions {
    fn from(settings: &ReportSettings) -> Self {
        Self {
            default_limit: settings.default_limit,
            max_limit: settings.max_limit,
        }
    }
}

/// Compiles report requests against one catalog snapshot.
#[derive(Debug, Clone)]
pub struct ReportCompiler<'a> {
    catalog: &'a Catalog,
    options: CompileOptions,
}

impl<'a> ReportCompiler<'a> {
    pub fn new(catalog: &'a Catalog, options: CompileOptions) -> Self {
        Self { catalog, options }
    }

    /// Compile `request`, failing on the first invalid reference.
    pub fn compile(&self, request: &ReportRequest) -> CompileResult<CompiledQuery> {
        let limit = validate_shape(request)?;

        let mut state = CompileState::new(self.catalog, request)?;

        let mut projections = Vec::new();
        for attribute in &request.attributes {
            projections.push(state.projection(attribute)?);
        }
        for aggregate in &request.aggregate_functions {
            projections.push(state.aggregate(aggregate)?);
        }

        let mut query = Query::new()
            .select(
                projections
                    .iter()
                    .map(|p| select_item(&p.expr, &p.alias))
                    .collect::<Vec<_>>(),
            )
            .from(TableRef::new(state.scope.base()));

        for join in &request.joins {
            let (table, on) = state.join(join)?;
            query = query.join(join.join_type.into(), table, on);
        }

        for filter in &request.filters {
            query = query.filter(state.filter(filter)?);
        }

        if !request.group_by_attributes.is_empty() {
            let group_by = request
                .group_by_attributes
                .iter()
                .map(|attribute| state.scope.resolve(attribute).map(|c| c.to_expr()))
                .collect::<CompileResult<Vec<_>>>()?;
            query = query.group_by(group_by);
        }

        if !request.order_by_columns.is_empty() {
            let order_by = request
                .order_by_columns
                .iter()
                .map(|spec| state.order_by(spec, &request.aggregate_functions))
                .collect::<CompileResult<Vec<_>>>()?;
            query = query.order_by(order_by);
        }

        let limit = state.clamp_limit(limit, self.options);
        query = query.limit(limit);

        Ok(CompiledQuery {
            projections,
            query,
            diagnostics: state.diagnostics,
        })
    }
}

/// Checks that need no catalog. Returns the requested limit, if any.
fn validate_shape(request: &ReportRequest) -> CompileResult<Option<u64>> {
    if request.base_table.trim().is_empty() {
        return Err(CompileError::validation("baseTable is required"));
    }
    if request.attributes.is_empty() {
        return Err(CompileError::validation("at least one attribute is required"));
    }
    if let Some(agg) = request.aggregate_functions.iter().find(|a| a.alias.trim().is_empty()) {
        return Err(CompileError::validation(format!(
            "aggregate {}({}) needs an alias",
            agg.function, agg.attribute
        )));
    }

    match request.limit {
        Some(n) if n <= 0 => Err(CompileError::validation(format!(
            "limit must be positive, got {}",
            n
        ))),
        Some(n) => Ok(Some(n as u64)),
        None => Ok(None),
    }
}

/// The alias is omitted when it would repeat the column name.
fn select_item(expr: &Expr, alias: &str) -> SelectExpr {
    let item = SelectExpr::new(expr.clone());
    match expr {
        Expr::Column { column, .. } if column == alias => item,
        _ => item.with_alias(alias),
    }
}

/// Per-request mutable state: scope, aliases, diagnostics.
struct CompileState<'a> {
    scope: TableScope<'a>,
    aliases: AliasAllocator,
    diagnostics: Vec<CompileDiagnostic>,
}

impl<'a> CompileState<'a> {
    /// Seed the scope with the base table and every join target, in order.
    ///
    /// Behaviour change: the scope does not grow join by join. Every join
    /// target is in scope before any projection resolves, so an unqualified
    /// attribute that exists only on a join target resolves to that target
    /// instead of failing with `UnknownColumn`.
    fn new(catalog: &'a Catalog, request: &ReportRequest) -> CompileResult<Self> {
        let mut scope = TableScope::new(catalog, request.base_table.trim())?;
        for join in &request.joins {
            scope.add(join.target_table.trim())?;
        }

        // Behaviour change: aggregate aliases are reserved before any
        // projection allocates, so a selected column whose bare name equals
        // an aggregate alias is suffixed (`name_table`) rather than keeping
        // the bare form.
        let mut aliases = AliasAllocator::new();
        for aggregate in &request.aggregate_functions {
            aliases.reserve(&aggregate.alias);
        }

        Ok(Self {
            scope,
            aliases,
            diagnostics: Vec::new(),
        })
    }

    fn projection(&mut self, attribute: &str) -> CompileResult<Projection> {
        if let Some((name, inner)) = functions::split_call(attribute) {
            let column = self.scope.resolve(inner)?;
            if let Some(function) = functions::lookup(name) {
                let alias = format!("{}_{}", function.name, column.column).to_lowercase();
                return Ok(Projection {
                    alias: self.aliases.allocate(&alias, &column.table),
                    expr: function.apply(column.to_expr()),
                });
            }
            self.unknown_function(name, attribute);
            return Ok(self.column_projection(&column));
        }

        let column = self.scope.resolve(attribute)?;
        Ok(self.column_projection(&column))
    }

    fn column_projection(&mut self, column: &ResolvedColumn) -> Projection {
        Projection {
            alias: self.aliases.allocate(&column.column, &column.table),
            expr: column.to_expr(),
        }
    }

    fn aggregate(&mut self, spec: &AggregateSpec) -> CompileResult<Projection> {
        let name = spec.function.trim().to_ascii_uppercase();
        let star = spec.attribute.trim() == "*";

        let expr = match (name.as_str(), star) {
            ("COUNT", true) => count_star(),
            (_, true) => {
                return Err(CompileError::validation(format!(
                    "{} cannot be applied to '*'",
                    spec.function
                )))
            }
            ("COUNT", false) => count(self.scope.resolve(&spec.attribute)?.to_expr()),
            ("SUM", false) => sum(self.scope.resolve(&spec.attribute)?.to_expr()),
            ("AVG", false) => avg(self.scope.resolve(&spec.attribute)?.to_expr()),
            ("MIN", false) => min(self.scope.resolve(&spec.attribute)?.to_expr()),
            ("MAX", false) => max(self.scope.resolve(&spec.attribute)?.to_expr()),
            ("COUNT_DISTINCT", false) => {
                count_distinct(self.scope.resolve(&spec.attribute)?.to_expr())
            }
            _ => return Err(CompileError::UnsupportedFunction(spec.function.clone())),
        };

        Ok(Projection {
            alias: spec.alias.clone(),
            expr,
        })
    }

    fn join(&mut self, spec: &JoinSpec) -> CompileResult<(TableRef, Expr)> {
        let target = spec.target_table.trim();
        let base = self.scope.base().to_string();

        let source = self.scope.resolve_on(&spec.source_attribute, &base)?;
        let target_column = self.scope.resolve_on(&spec.target_attribute, target)?;

        Ok((
            TableRef::new(target),
            source.to_expr().eq(target_column.to_expr()),
        ))
    }

    fn filter(&mut self, spec: &FilterSpec) -> CompileResult<Expr> {
        let operator = FilterOperator::parse(&spec.operator)?;
        let column = self.scope.resolve(&spec.attribute)?;

        let mut expr = column.to_expr();
        if let Some(name) = spec.function.as_deref().filter(|n| !n.trim().is_empty()) {
            expr = match functions::lookup(name) {
                Some(function) => function.apply(expr),
                None => {
                    self.unknown_function(name, &spec.attribute);
                    expr
                }
            };
        }

        operator.predicate(expr, &spec.value, &spec.attribute)
    }

    fn order_by(
        &mut self,
        spec: &OrderBySpec,
        aggregates: &[AggregateSpec],
    ) -> CompileResult<OrderByExpr> {
        let target = spec
            .target()
            .ok_or_else(|| CompileError::validation("order by entry needs an attribute"))?;

        let expr = if !target.contains('.') && aggregates.iter().any(|a| a.alias == target) {
            col(target)
        } else {
            self.scope.resolve(target)?.to_expr()
        };

        Ok(match SortDir::from(spec.direction) {
            SortDir::Asc => OrderByExpr::asc(expr),
            SortDir::Desc => OrderByExpr::desc(expr),
        })
    }

    fn clamp_limit(&mut self, requested: Option<u64>, options: CompileOptions) -> u64 {
        match requested {
            None => options.default_limit,
            Some(n) => match options.max_limit {
                Some(max) if n > max => {
                    tracing::warn!(requested = n, max, "Clamping report limit");
                    self.diagnostics.push(CompileDiagnostic::LimitClamped {
                        requested: n,
                        applied: max,
                    });
                    max
                }
                _ => n,
            },
        }
    }

    fn unknown_function(&mut self, function: &str, attribute: &str) {
        tracing::warn!(function, attribute, "Ignoring unknown function");
        self.diagnostics.push(CompileDiagnostic::UnknownFunction {
            function: function.to_string(),
            attribute: attribute.to_string(),
        });
    }
}
