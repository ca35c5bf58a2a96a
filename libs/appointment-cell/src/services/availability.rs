use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Timelike};
use reqwest::Method;
use tracing::{debug, warn};

use doctor_cell::models::Doctor;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, SlotAvailability, UnavailableReason,
};
use crate::services::timeslot;

/// Advisory slot check: working-hours rule plus a scan for confirmed
/// appointments inside the surrounding conflict window. The read holds no
/// lock against a later booking insert.
pub struct AvailabilityService {
    supabase: Arc<SupabaseClient>,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    /// Working-hours rule shared by the advisory check and booking. The
    /// comparison is by hour only; minutes within the boundary hours are
    /// not checked, so a 17:59 request against a 17:00 close passes. That
    /// coarse grain is observed behavior, kept on purpose.
    pub fn within_working_hours(
        doctor: &Doctor,
        requested: NaiveTime,
    ) -> Result<bool, AppointmentError> {
        let open = timeslot::parse_clock(doctor.open_time())?;
        let close = timeslot::parse_clock(doctor.close_time())?;

        Ok(requested.hour() >= open.hour() && requested.hour() <= close.hour())
    }

    pub async fn check_availability(
        &self,
        doctor: &Doctor,
        date: NaiveDate,
        requested: NaiveTime,
        auth_token: &str,
    ) -> Result<SlotAvailability, AppointmentError> {
        debug!(
            "Checking availability for doctor {} on {} at {}",
            doctor.id, date, requested
        );

        if !Self::within_working_hours(doctor, requested)? {
            return Ok(SlotAvailability::Unavailable {
                reason: UnavailableReason::OutsideWorkingHours,
            });
        }

        let conflicts = self
            .confirmed_appointments_in_window(doctor, date, requested, auth_token)
            .await?;

        if !conflicts.is_empty() {
            warn!(
                "Slot conflict for doctor {} on {} at {}: {} confirmed appointment(s) in window",
                doctor.id,
                date,
                requested,
                conflicts.len()
            );
            return Ok(SlotAvailability::Unavailable {
                reason: UnavailableReason::SlotTaken,
            });
        }

        Ok(SlotAvailability::Available)
    }

    async fn confirmed_appointments_in_window(
        &self,
        doctor: &Doctor,
        date: NaiveDate,
        requested: NaiveTime,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let date_instant = timeslot::normalize_date(date);
        let (from_time, to_time) = timeslot::conflict_window(requested);

        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=eq.{}&status=eq.{}&time=gte.{}&time=lte.{}",
            doctor.id,
            urlencoding::encode(&date_instant.to_rfc3339()),
            AppointmentStatus::Confirmed,
            urlencoding::encode(&from_time.to_rfc3339()),
            urlencoding::encode(&to_time.to_rfc3339()),
        );

        let appointments: Vec<Appointment> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(appointments)
    }
}
