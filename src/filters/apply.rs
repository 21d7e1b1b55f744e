use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use super::ast::{FieldFilter, FilterExpr, FilterField, FilterOperator};
use crate::models::Session;

/// Apply filters to sessions, keeping the ones that match
///
/// Filter logic:
/// - Same-field OR: tag:a tag:b → (a OR b)
/// - Cross-field AND: project:foo tag:a → (foo AND a)
/// - Explicit operators override defaults
///
/// Filters are evaluated left to right.
pub fn apply_filters(sessions: Vec<Session>, filter: &FilterExpr) -> Vec<Session> {
    if filter.is_empty() {
        return sessions;
    }

    sessions.into_iter().filter(|session| matches_filter(session, filter)).collect()
}

/// Evaluate filter expression against a single session
pub fn matches_filter(session: &Session, filter: &FilterExpr) -> bool {
    let Some(first) = filter.filters.first() else {
        return true;
    };

    let mut result = evaluate_field_filter(session, first);

    for (operator, next) in filter.operators.iter().zip(filter.filters.iter().skip(1)) {
        let next_result = evaluate_field_filter(session, next);
        result = match operator {
            FilterOperator::And => result && next_result,
            FilterOperator::Or => result || next_result,
        };
    }

    result
}

fn evaluate_field_filter(session: &Session, filter: &FieldFilter) -> bool {
    match filter.field {
        FilterField::Project => match_project(session, &filter.value),
        FilterField::Tag => session.has_tag(filter.value.trim()),
        FilterField::Since => {
            parse_day(&filter.value).is_some_and(|day| session.updated_at >= start_of_day(day))
        }
        FilterField::Until => parse_day(&filter.value)
            .and_then(|day| day.succ_opt())
            .is_some_and(|next| session.updated_at < start_of_day(next)),
        FilterField::Messages => {
            filter.value.parse::<usize>().is_ok_and(|min| session.message_count() >= min)
        }
    }
}

/// Match project path (case-insensitive substring match)
fn match_project(session: &Session, value: &str) -> bool {
    let lower_path = session.project.to_lowercase();
    let lower_value = value.to_lowercase();

    // Support ~ expansion
    let search_value = match (lower_value.starts_with('~'), dirs::home_dir()) {
        (true, Some(home)) => lower_value.replacen('~', &home.to_string_lossy().to_lowercase(), 1),
        _ => lower_value,
    };

    lower_path.contains(&search_value)
}

fn parse_day(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}
