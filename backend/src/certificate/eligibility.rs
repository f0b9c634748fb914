use common::model::assignment::Assignment;

/// Lowest number of correct answers that passes an exam of `total`
/// questions: `ceil(total * 0.7)`, computed in integers.
pub fn minimum_pass_score(total: u32) -> u32 {
    (u64::from(total) * 7).div_ceil(10) as u32
}

pub fn passes(correct: u32, total: u32) -> bool {
    correct >= minimum_pass_score(total)
}

/// Whether the assignment's latest exam attempt allows a certificate.
///
/// The stored `passed` flag decides when present. Older rows without it are
/// judged from `correct`/`total`; anything less is not eligible.
pub fn is_eligible(assignment: Option<&Assignment>) -> bool {
    let Some(attempt) = assignment.and_then(|a| a.exam_attempt.as_ref()) else {
        return false;
    };
    match (attempt.passed, attempt.correct, attempt.total) {
        (Some(passed), _, _) => passed,
        (None, Some(correct), Some(total)) => passes(correct, total),
        _ => false,
    }
}
