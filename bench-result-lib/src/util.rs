/// Curve name the benchmark harness prints on every line.
pub const HARNESS_CURVE: &str = "Bls12_381";

/// Formats one line the way the benchmark harness reports a measurement.
pub fn harness_line(operation: &str, leaves: usize, nanos: u128) -> String {
    format!("{operation} time for {HARNESS_CURVE} with {leaves} leaves: {nanos} ns")
}

/// Generates result text with `n` proving lines followed by `n` verifying lines.
///
/// Line `i` of each block reports a tree of `2^(i+1)` leaves. Proving takes
/// `(i+1) * 1.5s` and verifying `(i+1) * 2ms`, both in nanoseconds.
pub fn generate_result_text(n: usize) -> String {
    let leaves = |i: usize| 2usize.saturating_pow(i as u32 + 1);
    let proving = (0..n).map(|i| harness_line("Proving", leaves(i), (i as u128 + 1) * 1_500_000_000));
    let verifying = (0..n).map(|i| harness_line("Verifying", leaves(i), (i as u128 + 1) * 2_000_000));

    proving
        .chain(verifying)
        .map(|line| line + "\n")
        .collect()
}
