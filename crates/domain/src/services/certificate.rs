//! Certificate data assembly.
//!
//! Builds the render model for the client-side OD certificate. Attendance is
//! resolved preferentially from the live feed, falling back to the snapshot
//! stored at submission, then to "N/A".

use std::collections::HashMap;

use chrono::Utc;
use thiserror::Error;

use crate::models::certificate::{Certificate, CertificateRow};
use crate::models::od_request::{OdRequest, OdStatus};

/// Why a certificate could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CertificateError {
    #[error("Certificate is only available for approved requests (status: {0})")]
    NotApproved(OdStatus),
}

/// Formats an attendance percentage for the certificate table.
fn format_attendance(value: Option<f64>) -> String {
    match value {
        Some(pct) => format!("{:.1}%", pct),
        None => "N/A".to_string(),
    }
}

/// Assembles the certificate render model for an approved request.
///
/// `live_attendance` maps register numbers to current percentages from the
/// attendance feed; entries may be missing (or the whole map empty when the
/// feed was unreachable), in which case the stored snapshot is used.
pub fn build_certificate(
    request: &OdRequest,
    live_attendance: &HashMap<String, f64>,
) -> Result<Certificate, CertificateError> {
    if !matches!(request.status, OdStatus::Approved | OdStatus::Completed) {
        return Err(CertificateError::NotApproved(request.status));
    }

    let rows = request
        .participants
        .iter()
        .map(|p| CertificateRow {
            register_number: p.register_number.clone(),
            name: p.name.clone(),
            semester: p.semester,
            // The feed keys rows by uppercased register number.
            attendance: format_attendance(
                live_attendance
                    .get(&p.register_number.to_uppercase())
                    .copied()
                    .or(p.attendance_percentage),
            ),
        })
        .collect();

    Ok(Certificate {
        request_id: request.request_id.clone(),
        event_name: request.event_name.clone(),
        venue: request.venue.clone(),
        from_date: request.from_date,
        to_date: request.to_date,
        number_of_days: request.number_of_days,
        tutor_name: request.tutor.name.clone(),
        signature_url: request
            .decision
            .as_ref()
            .and_then(|d| d.signature_url.clone()),
        rows,
        generated_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invitation::InvitationStatus;
    use crate::models::od_request::{Decision, Participant, TutorSnapshot};
    use chrono::NaiveDate;

    fn approved_request() -> OdRequest {
        let now = Utc::now();
        OdRequest {
            request_id: "OD1709281520123-4831".into(),
            event_name: "Tech Fest".into(),
            from_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            number_of_days: 2,
            venue: "Anna University".into(),
            status: OdStatus::Approved,
            tutor: TutorSnapshot {
                name: "Dr. Rao".into(),
                email: Some("rao@college.edu".into()),
                staff_id: Some("CSE042".into()),
            },
            participants: vec![
                Participant {
                    register_number: "21CSE042".into(),
                    name: "Asha".into(),
                    email: "asha@college.edu".into(),
                    semester: 5,
                    section: Some("A".into()),
                    attendance_percentage: Some(91.25),
                    is_requester: true,
                    status: InvitationStatus::Accepted,
                    invitation_id: None,
                },
                Participant {
                    register_number: "21CSE043".into(),
                    name: "Vikram".into(),
                    email: "vikram@college.edu".into(),
                    semester: 5,
                    section: Some("A".into()),
                    attendance_percentage: None,
                    is_requester: false,
                    status: InvitationStatus::Accepted,
                    invitation_id: Some(uuid::Uuid::new_v4()),
                },
            ],
            decision: Some(Decision {
                decided_by: "Dr. Rao".into(),
                decided_at: now,
                comments: None,
                signature_url: Some("https://files.college.edu/signatures/rao.png".into()),
            }),
            documents: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_live_feed_wins_over_snapshot() {
        let request = approved_request();
        let mut live = HashMap::new();
        live.insert("21CSE042".to_string(), 88.0);

        let cert = build_certificate(&request, &live).unwrap();
        assert_eq!(cert.rows[0].attendance, "88.0%");
    }

    #[test]
    fn test_live_feed_matches_mixed_case_register_number() {
        let mut request = approved_request();
        request.participants[0].register_number = "21cse042".into();
        let mut live = HashMap::new();
        live.insert("21CSE042".to_string(), 88.0);

        let cert = build_certificate(&request, &live).unwrap();
        assert_eq!(cert.rows[0].attendance, "88.0%");
    }

    #[test]
    fn test_snapshot_fallback_when_feed_missing_entry() {
        let request = approved_request();
        let cert = build_certificate(&request, &HashMap::new()).unwrap();
        assert_eq!(cert.rows[0].attendance, "91.2%");
    }

    #[test]
    fn test_na_when_neither_resolves() {
        let request = approved_request();
        let cert = build_certificate(&request, &HashMap::new()).unwrap();
        assert_eq!(cert.rows[1].attendance, "N/A");
    }

    #[test]
    fn test_signature_carried_from_decision() {
        let request = approved_request();
        let cert = build_certificate(&request, &HashMap::new()).unwrap();
        assert_eq!(
            cert.signature_url.as_deref(),
            Some("https://files.college.edu/signatures/rao.png")
        );
    }

    #[test]
    fn test_pending_request_is_rejected() {
        let mut request = approved_request();
        request.status = OdStatus::Pending;
        let result = build_certificate(&request, &HashMap::new());
        assert!(matches!(
            result,
            Err(CertificateError::NotApproved(OdStatus::Pending))
        ));
    }

    #[test]
    fn test_completed_request_is_allowed() {
        let mut request = approved_request();
        request.status = OdStatus::Completed;
        assert!(build_certificate(&request, &HashMap::new()).is_ok());
    }
}
