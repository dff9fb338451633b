/// Parse a "M:SS" pace into total seconds per kilometer.
///
/// Returns None for anything that does not match the stored pace shape
/// (minutes, colon, exactly two second digits).
pub fn pace_seconds(pace: &str) -> Option<u32> {
    let (minutes, seconds) = pace.split_once(':')?;
    if seconds.len() != 2 {
        return None;
    }
    let minutes: u32 = minutes.parse().ok()?;
    let seconds: u32 = seconds.parse().ok()?;
    minutes.checked_mul(60)?.checked_add(seconds)
}

/// Score a session from distance and pace.
///
/// `distance * 10` plus a pace bonus of `(300 - paceSeconds) / 10`, floored at
/// zero so the bonus saturates once the pace reaches 5:00/km or slower. The
/// result is rounded half-up to two decimals. Pure and deterministic; equal
/// inputs always produce equal scores, which is what keeps rankings
/// reproducible.
pub fn score(distance: f64, pace: &str) -> f64 {
    let bonus = match pace_seconds(pace) {
        Some(seconds) => ((300.0 - seconds as f64) / 10.0).max(0.0),
        // Persisted records always carry a valid pace; an unparseable one
        // simply earns no bonus.
        None => 0.0,
    };
    round2(distance * 10.0 + bonus)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
