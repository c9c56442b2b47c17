use subtle::ConstantTimeEq;

/// Exact, case-sensitive comparison of a submitted secret against the
/// expected value, in constant time for equal-length inputs.
pub fn secrets_match(expected: &str, candidate: &str) -> bool {
    let expected_bytes = expected.as_bytes();
    let candidate_bytes = candidate.as_bytes();

    if expected_bytes.len() != candidate_bytes.len() {
        return false;
    }

    expected_bytes.ct_eq(candidate_bytes).into()
}
