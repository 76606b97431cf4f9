//! Capacity bookkeeping for postings. The only code that writes `accepted_count`.

use super::domain::{Internship, InternshipStatus};
use super::outcome::Refusal;

/// Consumes one slot for a confirmed offer, flipping the posting to `Filled` on the last slot.
pub(crate) fn accept_slot(internship: &mut Internship) -> Result<(), Refusal> {
    if !internship.has_capacity() {
        return Err(Refusal::NoCapacity);
    }

    internship.accepted_count += 1;
    if internship.accepted_count == internship.slots {
        internship.status = InternshipStatus::Filled;
    }

    Ok(())
}

/// Returns one slot after an accepted offer is withdrawn; a filled posting reopens.
pub(crate) fn release_slot(internship: &mut Internship) {
    internship.accepted_count = internship.accepted_count.saturating_sub(1);
    if internship.status == InternshipStatus::Filled && internship.has_capacity() {
        internship.status = InternshipStatus::Approved;
    }
}
