/// Filter fields supported on sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    /// Filter by project path (supports ~ and partial matches)
    Project,
    /// Filter by tag (exact, case-insensitive)
    Tag,
    /// Sessions updated on or after a date (YYYY-MM-DD)
    Since,
    /// Sessions updated on or before a date (YYYY-MM-DD)
    Until,
    /// Sessions with at least this many messages
    Messages,
}

impl FilterField {
    pub const NAMES: &'static str = "project, tag, since, until, messages";
}

/// Logical operators for combining filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Both conditions must match (default between different fields)
    And,
    /// Either condition matches (default within same field)
    Or,
}

/// Single field:value filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: FilterField,
    pub value: String,
}

impl FieldFilter {
    pub fn new(field: FilterField, value: impl Into<String>) -> Self {
        Self { field, value: value.into() }
    }
}

/// Filter expression combining multiple field filters with operators
///
/// No parentheses:
/// - Same-field filters are OR'd together: tag:a tag:b → (a OR b)
/// - Cross-field filters are AND'd together: project:foo tag:a → (foo AND a)
/// - Explicit operators override defaults
/// - Evaluation is left to right
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterExpr {
    pub filters: Vec<FieldFilter>,
    pub operators: Vec<FilterOperator>,
}

impl FilterExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_filter(&mut self, filter: FieldFilter) {
        self.filters.push(filter);
    }

    pub fn add_operator(&mut self, operator: FilterOperator) {
        self.operators.push(operator);
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Adds `filter` joined with AND, as used when CLI flags narrow a parsed expression
    pub fn and(mut self, filter: FieldFilter) -> Self {
        if !self.filters.is_empty() {
            self.operators.push(FilterOperator::And);
        }
        self.filters.push(filter);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_expr_empty() {
        let expr = FilterExpr::new();
        assert!(expr.is_empty());
        assert!(expr.operators.is_empty());
    }

    #[test]
    fn test_filter_expr_with_operators() {
        let mut expr = FilterExpr::new();
        expr.add_filter(FieldFilter::new(FilterField::Project, "foo"));
        expr.add_operator(FilterOperator::And);
        expr.add_filter(FieldFilter::new(FilterField::Tag, "work"));
        assert_eq!(expr.filters.len(), 2);
        assert_eq!(expr.operators, vec![FilterOperator::And]);
    }

    #[test]
    fn test_and_joins_only_between_filters() {
        let expr = FilterExpr::new().and(FieldFilter::new(FilterField::Tag, "a"));
        assert!(expr.operators.is_empty());
        let expr = expr.and(FieldFilter::new(FilterField::Messages, "3"));
        assert_eq!(expr.operators, vec![FilterOperator::And]);
    }
}
