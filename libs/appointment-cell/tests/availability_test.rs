use chrono::{NaiveDate, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{
    AppointmentError, CheckAvailabilityRequest, SlotAvailability, UnavailableReason,
};
use appointment_cell::services::{timeslot, AvailabilityService, BookingService};
use doctor_cell::models::{Doctor, DoctorStatus};
use shared_utils::test_utils::{MockStoreResponses, TestConfig};

fn approved_doctor(open: &str, close: &str) -> Doctor {
    Doctor {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        email: "jane.doe@example.com".to_string(),
        phone_number: "+15550100".to_string(),
        website: "https://drjanedoe.example.com".to_string(),
        address: "1 Clinic Street".to_string(),
        specialization: "Cardiology".to_string(),
        experience: "10 years".to_string(),
        fee_per_consultation: 120.0,
        timings: [open.to_string(), close.to_string()],
        status: DoctorStatus::Approved,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn booking_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
}

async fn mount_no_appointments(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn boundary_hours_are_bookable() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    mount_no_appointments(&mock_server).await;

    let doctor = approved_doctor("09:00", "17:00");
    let service = AvailabilityService::new(&config);

    for requested in ["09:00", "12:15", "17:00"] {
        let availability = service
            .check_availability(&doctor, booking_date(), timeslot::parse_clock(requested).unwrap(), "token")
            .await
            .unwrap();
        assert_eq!(availability, SlotAvailability::Available, "at {}", requested);
    }
}

#[tokio::test]
async fn minutes_within_the_closing_hour_are_not_checked() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    mount_no_appointments(&mock_server).await;

    let doctor = approved_doctor("09:00", "17:00");
    let service = AvailabilityService::new(&config);

    // Hour-granularity comparison: 17:59 still counts as the closing hour.
    let availability = service
        .check_availability(&doctor, booking_date(), timeslot::parse_clock("17:59").unwrap(), "token")
        .await
        .unwrap();

    assert_eq!(availability, SlotAvailability::Available);
}

#[tokio::test]
async fn requests_outside_working_hours_are_refused() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();

    let doctor = approved_doctor("09:00", "17:00");
    let service = AvailabilityService::new(&config);

    for requested in ["08:00", "08:59", "18:00", "23:00"] {
        let availability = service
            .check_availability(&doctor, booking_date(), timeslot::parse_clock(requested).unwrap(), "token")
            .await
            .unwrap();
        assert_eq!(
            availability,
            SlotAvailability::Unavailable {
                reason: UnavailableReason::OutsideWorkingHours
            },
            "at {}",
            requested
        );
    }

    // The working-hours rule short-circuits before any store read.
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn confirmed_appointment_in_window_blocks_the_slot() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();

    let doctor = approved_doctor("09:00", "17:00");

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment_record(
                &Uuid::new_v4().to_string(),
                &Uuid::new_v4().to_string(),
                &doctor.id.to_string(),
                "2024-01-10T00:00:00Z",
                "1970-01-01T16:00:00Z",
                "confirmed",
            )
        ])))
        .mount(&mock_server)
        .await;

    let service = AvailabilityService::new(&config);
    let availability = service
        .check_availability(&doctor, booking_date(), timeslot::parse_clock("16:30").unwrap(), "token")
        .await
        .unwrap();

    assert_eq!(
        availability,
        SlotAvailability::Unavailable {
            reason: UnavailableReason::SlotTaken
        }
    );

    // The store was asked for confirmed appointments in the +/- 60 minute
    // window around 16:30 on that day.
    let requests = mock_server.received_requests().await.unwrap();
    let query = requests[0].url.query().unwrap().to_string();
    assert!(query.contains(&format!("doctor_id=eq.{}", doctor.id)));
    assert!(query.contains("status=eq.confirmed"));
    assert!(query.contains("date=eq.2024-01-10T00%3A00%3A00%2B00%3A00"));
    assert!(query.contains("time=gte.1970-01-01T15%3A30%3A00%2B00%3A00"));
    assert!(query.contains("time=lte.1970-01-01T17%3A30%3A00%2B00%3A00"));
}

#[tokio::test]
async fn clear_window_is_available() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    mount_no_appointments(&mock_server).await;

    let doctor = approved_doctor("09:00", "17:00");
    let service = AvailabilityService::new(&config);

    let availability = service
        .check_availability(&doctor, booking_date(), timeslot::parse_clock("16:00").unwrap(), "token")
        .await
        .unwrap();

    assert_eq!(availability, SlotAvailability::Available);
}

#[tokio::test]
async fn malformed_time_is_a_validation_error() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();

    let service = BookingService::new(&config);
    let err = service
        .check_availability(
            CheckAvailabilityRequest {
                doctor_id: Uuid::new_v4(),
                date: booking_date(),
                time: "half past nine".to_string(),
            },
            "token",
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppointmentError::InvalidTime(_)));
}

#[tokio::test]
async fn unknown_doctor_is_not_found() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let service = BookingService::new(&config);
    let err = service
        .check_availability(
            CheckAvailabilityRequest {
                doctor_id: Uuid::new_v4(),
                date: booking_date(),
                time: "10:00".to_string(),
            },
            "token",
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppointmentError::DoctorNotFound));
}
