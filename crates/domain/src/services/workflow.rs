//! OD request workflow logic.
//!
//! Pure functions over the draft, its invitations and the participant list.
//! The route layer owns persistence; everything here is side-effect free so
//! the state machine can be tested without a database.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::models::invitation::{Invitation, InvitationStatus};
use crate::models::od_request::{Participant, SubmitOdRequest};

/// Workflow rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// A required field is missing or malformed; names the first failing
    /// field.
    #[error("Validation failed on field: {0}")]
    Validation(String),

    /// The draft still has unresolved pending invitations.
    #[error("Draft has unresolved pending invitations")]
    PendingInvitationsExist,

    /// A student cannot invite themselves.
    #[error("Cannot invite yourself to your own request")]
    SelfInvitation,

    /// The target already joined this draft.
    #[error("Student is already a participant of this request")]
    AlreadyAdded,

    /// An unresolved invitation to the same target already exists.
    #[error("An invitation to this student is already pending")]
    AlreadyPending,
}

/// Inclusive day count between two dates: same-day requests count as 1.
pub fn inclusive_day_count(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days() + 1
}

/// Validates a submission draft, enumerating the first failing field.
///
/// Presence checks duplicate the derive-level validation on purpose: the
/// API reports only the first failing field, and `validator` aggregates
/// instead.
pub fn validate_draft(
    draft: &SubmitOdRequest,
    participants: &[Participant],
) -> Result<(), WorkflowError> {
    if draft.event_name.trim().is_empty() {
        return Err(WorkflowError::Validation("eventName".into()));
    }
    if draft.to_date < draft.from_date {
        return Err(WorkflowError::Validation("toDate".into()));
    }
    if draft.venue.trim().is_empty() {
        return Err(WorkflowError::Validation("venue".into()));
    }
    if draft.tutor_name.trim().is_empty() {
        return Err(WorkflowError::Validation("tutorName".into()));
    }
    if participants.is_empty() {
        return Err(WorkflowError::Validation("students".into()));
    }
    for participant in participants {
        if participant.register_number.trim().is_empty() {
            return Err(WorkflowError::Validation("students.registerNumber".into()));
        }
        if participant.name.trim().is_empty() {
            return Err(WorkflowError::Validation("students.name".into()));
        }
        if participant.semester < 1 {
            return Err(WorkflowError::Validation("students.semester".into()));
        }
    }
    Ok(())
}

/// Checks the invariant that participant #0 is the requester.
pub fn requester_leads(participants: &[Participant]) -> bool {
    participants
        .first()
        .map(|p| p.is_requester && p.invitation_id.is_none())
        .unwrap_or(false)
}

/// Guards for sending a new invitation on a draft.
///
/// `existing` is the draft's current invitation set (expired ones already
/// filtered out by the caller).
pub fn check_send_invitation(
    requester_register_number: &str,
    target_register_number: &str,
    participants: &[Participant],
    existing: &[Invitation],
) -> Result<(), WorkflowError> {
    if requester_register_number.eq_ignore_ascii_case(target_register_number) {
        return Err(WorkflowError::SelfInvitation);
    }

    let already_participant = participants
        .iter()
        .any(|p| p.register_number.eq_ignore_ascii_case(target_register_number));
    let already_accepted = existing.iter().any(|i| {
        i.register_number.eq_ignore_ascii_case(target_register_number)
            && i.status == InvitationStatus::Accepted
    });
    if already_participant || already_accepted {
        return Err(WorkflowError::AlreadyAdded);
    }

    let unresolved = existing.iter().any(|i| {
        i.register_number.eq_ignore_ascii_case(target_register_number)
            && i.status == InvitationStatus::Pending
    });
    if unresolved {
        return Err(WorkflowError::AlreadyPending);
    }

    Ok(())
}

/// Promotes accepted invitations into participant entries, exactly once.
///
/// Idempotent by register number: a participant already present is never
/// added again, so repeated polls (or a poll followed by submit) cannot
/// double-add. Declined or expired invitations contribute nothing. Returns
/// the number of participants added.
pub fn reconcile_participants(
    participants: &mut Vec<Participant>,
    invitations: &[Invitation],
) -> usize {
    let mut promoted = 0;

    for invitation in invitations {
        if invitation.status != InvitationStatus::Accepted {
            continue;
        }
        let present = participants
            .iter()
            .any(|p| p.register_number.eq_ignore_ascii_case(&invitation.register_number));
        if present {
            continue;
        }
        participants.push(participant_from_invitation(invitation));
        promoted += 1;
    }

    promoted
}

/// Builds the participant snapshot for an accepted invitation.
pub fn participant_from_invitation(invitation: &Invitation) -> Participant {
    Participant {
        register_number: invitation.register_number.clone(),
        name: invitation.target_name.clone(),
        email: invitation.recipient_email.clone(),
        semester: invitation.target_semester,
        section: invitation.target_section.clone(),
        attendance_percentage: None,
        is_requester: false,
        status: InvitationStatus::Accepted,
        invitation_id: Some(invitation.id),
    }
}

/// Fails if the draft still has unresolved, unexpired pending invitations.
pub fn ensure_no_pending(invitations: &[Invitation], now: DateTime<Utc>) -> Result<(), WorkflowError> {
    let unresolved = invitations
        .iter()
        .any(|i| i.status == InvitationStatus::Pending && i.expires_at > now);
    if unresolved {
        Err(WorkflowError::PendingInvitationsExist)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn requester() -> Participant {
        Participant {
            register_number: "21CSE042".into(),
            name: "Asha".into(),
            email: "asha@college.edu".into(),
            semester: 5,
            section: Some("A".into()),
            attendance_percentage: Some(91.0),
            is_requester: true,
            status: InvitationStatus::Accepted,
            invitation_id: None,
        }
    }

    fn invitation(register: &str, status: InvitationStatus) -> Invitation {
        let now = Utc::now();
        Invitation {
            id: Uuid::new_v4(),
            od_request_id: "OD1709281520123-4831".into(),
            register_number: register.into(),
            recipient_email: format!("{}@college.edu", register.to_lowercase()),
            target_name: "Peer".into(),
            target_semester: 5,
            target_section: Some("A".into()),
            event_name: "Tech Fest".into(),
            from_date: date(2024, 3, 1),
            to_date: date(2024, 3, 2),
            requester_register_number: "21CSE042".into(),
            requester_name: "Asha".into(),
            requester_email: "asha@college.edu".into(),
            status,
            responded_at: status.is_terminal().then(|| now),
            created_at: now,
            expires_at: now + Duration::hours(1),
        }
    }

    fn draft() -> SubmitOdRequest {
        SubmitOdRequest {
            od_request_id: "OD1709281520123-4831".into(),
            event_name: "Tech Fest".into(),
            from_date: date(2024, 3, 1),
            to_date: date(2024, 3, 2),
            venue: "Anna University".into(),
            tutor_name: "Dr. Rao".into(),
        }
    }

    #[test]
    fn test_inclusive_day_count() {
        assert_eq!(inclusive_day_count(date(2024, 3, 1), date(2024, 3, 2)), 2);
        assert_eq!(inclusive_day_count(date(2024, 3, 1), date(2024, 3, 8)), 8);
    }

    #[test]
    fn test_same_day_counts_as_one() {
        assert_eq!(inclusive_day_count(date(2024, 3, 1), date(2024, 3, 1)), 1);
    }

    #[test]
    fn test_validate_draft_ok() {
        assert!(validate_draft(&draft(), &[requester()]).is_ok());
    }

    #[test]
    fn test_validate_draft_names_first_failing_field() {
        let mut d = draft();
        d.event_name = " ".into();
        assert_eq!(
            validate_draft(&d, &[requester()]),
            Err(WorkflowError::Validation("eventName".into()))
        );

        let mut d = draft();
        d.to_date = date(2024, 2, 28);
        assert_eq!(
            validate_draft(&d, &[requester()]),
            Err(WorkflowError::Validation("toDate".into()))
        );

        let mut d = draft();
        d.tutor_name = String::new();
        assert_eq!(
            validate_draft(&d, &[requester()]),
            Err(WorkflowError::Validation("tutorName".into()))
        );
    }

    #[test]
    fn test_validate_draft_checks_participants() {
        assert_eq!(
            validate_draft(&draft(), &[]),
            Err(WorkflowError::Validation("students".into()))
        );

        let mut p = requester();
        p.semester = 0;
        assert_eq!(
            validate_draft(&draft(), &[p]),
            Err(WorkflowError::Validation("students.semester".into()))
        );
    }

    #[test]
    fn test_requester_leads() {
        assert!(requester_leads(&[requester()]));

        let mut p = requester();
        p.is_requester = false;
        assert!(!requester_leads(&[p]));
        assert!(!requester_leads(&[]));
    }

    #[test]
    fn test_self_invitation_always_fails() {
        let err = check_send_invitation("21CSE042", "21CSE042", &[requester()], &[]);
        assert_eq!(err, Err(WorkflowError::SelfInvitation));

        // case-insensitive on register numbers
        let err = check_send_invitation("21cse042", "21CSE042", &[], &[]);
        assert_eq!(err, Err(WorkflowError::SelfInvitation));
    }

    #[test]
    fn test_already_added_guard() {
        let mut peer = requester();
        peer.register_number = "21CSE043".into();
        peer.is_requester = false;

        let err = check_send_invitation("21CSE042", "21CSE043", &[requester(), peer], &[]);
        assert_eq!(err, Err(WorkflowError::AlreadyAdded));

        // accepted-but-not-yet-promoted also counts as added
        let accepted = invitation("21CSE044", InvitationStatus::Accepted);
        let err = check_send_invitation("21CSE042", "21CSE044", &[requester()], &[accepted]);
        assert_eq!(err, Err(WorkflowError::AlreadyAdded));
    }

    #[test]
    fn test_already_pending_guard() {
        let pending = invitation("21CSE045", InvitationStatus::Pending);
        let err = check_send_invitation("21CSE042", "21CSE045", &[requester()], &[pending]);
        assert_eq!(err, Err(WorkflowError::AlreadyPending));
    }

    #[test]
    fn test_declined_target_can_be_reinvited() {
        let declined = invitation("21CSE046", InvitationStatus::Declined);
        let ok = check_send_invitation("21CSE042", "21CSE046", &[requester()], &[declined]);
        assert!(ok.is_ok());
    }

    #[test]
    fn test_reconcile_promotes_accepted_once() {
        let mut participants = vec![requester()];
        let accepted = invitation("21CSE047", InvitationStatus::Accepted);

        let promoted = reconcile_participants(&mut participants, &[accepted.clone()]);
        assert_eq!(promoted, 1);
        assert_eq!(participants.len(), 2);
        assert_eq!(participants[1].invitation_id, Some(accepted.id));
        assert!(!participants[1].is_requester);

        // running again must not double-add
        let promoted = reconcile_participants(&mut participants, &[accepted]);
        assert_eq!(promoted, 0);
        assert_eq!(participants.len(), 2);
    }

    #[test]
    fn test_reconcile_ignores_declined_and_pending() {
        let mut participants = vec![requester()];
        let declined = invitation("21CSE048", InvitationStatus::Declined);
        let pending = invitation("21CSE049", InvitationStatus::Pending);

        let promoted = reconcile_participants(&mut participants, &[declined, pending]);
        assert_eq!(promoted, 0);
        assert_eq!(participants.len(), 1);
    }

    #[test]
    fn test_ensure_no_pending() {
        let now = Utc::now();
        let pending = invitation("21CSE050", InvitationStatus::Pending);
        assert_eq!(
            ensure_no_pending(&[pending.clone()], now),
            Err(WorkflowError::PendingInvitationsExist)
        );

        // expired pending invitations no longer block submission
        let mut expired = pending;
        expired.expires_at = now - Duration::minutes(1);
        assert!(ensure_no_pending(&[expired], now).is_ok());

        let accepted = invitation("21CSE051", InvitationStatus::Accepted);
        assert!(ensure_no_pending(&[accepted], now).is_ok());
    }
}
