// Error mapping and input validation edge cases

use chrono::NaiveDate;
use rescuetime_pulse_lib::commands::CommandError;
use rescuetime_pulse_lib::error::{AppError, FetchError};
use rescuetime_pulse_lib::models::analytic_data::ApiStatus;
use rescuetime_pulse_lib::services::query_block::parse_query_block;
use serde_json::json;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).expect("today")
}

#[test]
fn validation_error_keeps_prefix_and_details() {
    let error: CommandError = AppError::validation_with_details(
        "API base URL is invalid",
        json!({ "baseUrl": "nope" }),
    )
    .into();

    assert_eq!(error.code, "VALIDATION_ERROR");
    assert_eq!(error.message, "User input error: API base URL is invalid");
    assert_eq!(error.details, Some(json!({ "baseUrl": "nope" })));
}

#[test]
fn missing_field_error_names_the_field() {
    let error: CommandError = AppError::missing_field("productivity").into();

    assert_eq!(error.code, "MISSING_FIELD");
    assert_eq!(
        error.message,
        "productivity cannot be obtained from the fetched data"
    );
    assert_eq!(error.details, Some(json!({ "field": "productivity" })));
}

#[test]
fn every_unavailable_status_maps_to_its_message() {
    for status in [
        ApiStatus::EmptyData,
        ApiStatus::UnexpectedDatatype,
        ApiStatus::InvalidParam,
        ApiStatus::Unreachable,
        ApiStatus::Unknown,
    ] {
        let error: CommandError = AppError::data_unavailable(status).into();
        assert_eq!(error.code, "DATA_UNAVAILABLE");
        assert_eq!(error.message, status.message());
        assert_eq!(error.details, Some(json!({ "status": status.as_str() })));
    }
}

#[test]
fn fetch_errors_use_connection_messages() {
    let query: CommandError = AppError::Fetch(FetchError::query("HTTP error. Status: 401")).into();
    assert_eq!(query.code, "FETCH_FAILED");
    assert_eq!(
        query.message,
        "API request failed. Check your API key. HTTP error. Status: 401"
    );
    assert_eq!(query.details, Some(json!({ "kind": "QueryError" })));

    let other: CommandError = AppError::Fetch(FetchError::other("boom")).into();
    assert!(other.message.ends_with("Message from RescueTime API: boom"));
}

#[test]
fn command_error_serializes_camel_case_without_empty_details() {
    let error: CommandError = AppError::other("unexpected").into();
    let value = serde_json::to_value(&error).expect("serialize");

    assert_eq!(value, json!({ "code": "UNKNOWN", "message": "unexpected" }));
}

#[test]
fn io_errors_are_unknown() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let error: CommandError = AppError::from(io).into();
    assert_eq!(error.code, "UNKNOWN");
}

#[test]
fn query_block_rejections_carry_user_messages() {
    let cases = [
        ("", "Invalid format. Expected 'FROM YYYY-MM-DD TO YYYY-MM-DD'."),
        ("FROM 2024-06-01 TO 2024-6-10", "Invalid format. Expected 'FROM YYYY-MM-DD TO YYYY-MM-DD'."),
        ("FROM 2024-13-01 TO 2024-06-10", "Invalid date format."),
        ("FROM 2024-06-10 TO 2024-06-09", "Start date must come before the end date."),
        ("FROM 2024-01-01 TO 2024-01-05", "Start date must be 92 or less days before today."),
        (
            "FROM 2024-04-01 TO 2024-05-15",
            "The period specified between start date and end date must span 31 days or less.",
        ),
    ];

    for (source, expected) in cases {
        let error: CommandError = parse_query_block(source, today())
            .expect_err(source)
            .into();
        assert_eq!(error.code, "VALIDATION_ERROR", "{source}");
        assert_eq!(error.message, format!("User input error: {expected}"), "{source}");
    }
}

#[test]
fn query_block_accepts_single_day_and_surrounding_whitespace() {
    let period = parse_query_block("\n  FROM 2024-06-15 TO 2024-06-15  \n", today()).expect("period");
    assert_eq!(period.start, "2024-06-15");
    assert_eq!(period.end, "2024-06-15");
}
