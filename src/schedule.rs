use crate::matcher::Transfer;

/// Order stage 1 so the instrument loads each target plate once and cycles
/// through the source plates inside it: target plate first, source plate as
/// tiebreak. The sort is stable, so ties keep matcher order.
pub fn order_stage_one(transfers: &mut [Transfer]) {
    transfers.sort_by_key(|t| (t.target_plate, t.source_plate));
}

/// Stage 2 categories sit on a single source plate, so grouping by target
/// plate alone already minimizes plate changes.
pub fn order_stage_two(transfers: &mut [Transfer]) {
    transfers.sort_by_key(|t| t.target_plate);
}
