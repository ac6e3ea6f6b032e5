//! Usage-event coalescing.
//!
//! Usage of a resource is typically sparse across the event timeline, and
//! the display goal is "the span during which this kind of usage recurred".
//! The merge key is equality of usage kind, not contiguity of event ids:
//! two reads separated by a thousand unrelated events still collapse into
//! one range, while a read followed by a write always splits.

use fresnel_types::{EventUsage, UsageRange};

/// Merge an ordered sequence of raw usage observations into display ranges.
///
/// Input must be ordered by event id non-decreasing; duplicates at the same
/// event id are tolerated. Output ranges are ordered by start and do not
/// overlap. Single pass, no allocation beyond the output.
pub fn coalesce_usage(events: &[EventUsage]) -> Vec<UsageRange> {
    let mut ranges = Vec::new();
    let Some(first) = events.first() else {
        return ranges;
    };

    let mut open = UsageRange {
        start: first.event_id,
        end: first.event_id,
        usage: first.usage,
    };
    for event in &events[1..] {
        if event.usage == open.usage {
            open.end = event.event_id;
        } else {
            ranges.push(open);
            open = UsageRange {
                start: event.event_id,
                end: event.event_id,
                usage: event.usage,
            };
        }
    }
    ranges.push(open);
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use fresnel_types::UsageKind::{ColorTarget, CopySource, ShaderRead, ShaderWrite};

    fn events(raw: &[(u32, fresnel_types::UsageKind)]) -> Vec<EventUsage> {
        raw.iter().map(|&(id, usage)| EventUsage::new(id, usage)).collect()
    }

    #[test]
    fn empty_input_produces_no_ranges() {
        assert!(coalesce_usage(&[]).is_empty());
    }

    #[test]
    fn single_event_produces_degenerate_range() {
        let ranges = coalesce_usage(&events(&[(42, ShaderRead)]));
        assert_eq!(
            ranges,
            vec![UsageRange {
                start: 42,
                end: 42,
                usage: ShaderRead
            }]
        );
    }

    #[test]
    fn single_kind_collapses_to_one_spanning_range() {
        let ranges = coalesce_usage(&events(&[
            (3, ColorTarget),
            (17, ColorTarget),
            (17, ColorTarget),
            (908, ColorTarget),
        ]));
        assert_eq!(
            ranges,
            vec![UsageRange {
                start: 3,
                end: 908,
                usage: ColorTarget
            }]
        );
    }

    #[test]
    fn kind_change_splits_ranges() {
        // Mixed read/write pattern across a draw sequence.
        let ranges = coalesce_usage(&events(&[
            (10, ShaderRead),
            (12, ShaderRead),
            (15, ShaderWrite),
            (20, ShaderWrite),
            (21, ShaderRead),
        ]));
        assert_eq!(
            ranges,
            vec![
                UsageRange {
                    start: 10,
                    end: 12,
                    usage: ShaderRead
                },
                UsageRange {
                    start: 15,
                    end: 20,
                    usage: ShaderWrite
                },
                UsageRange {
                    start: 21,
                    end: 21,
                    usage: ShaderRead
                },
            ]
        );
    }

    #[test]
    fn merge_ignores_gaps_between_event_ids() {
        // Kind equality merges across arbitrary gaps; adjacency of ids does
        // not split anything on its own.
        let ranges = coalesce_usage(&events(&[
            (1, CopySource),
            (5000, CopySource),
            (5001, ShaderRead),
            (5002, ShaderRead),
        ]));
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].start, 1);
        assert_eq!(ranges[0].end, 5000);
        assert_eq!(ranges[1].start, 5001);
        assert_eq!(ranges[1].end, 5002);
    }

    #[test]
    fn duplicate_event_ids_with_different_kinds_each_get_a_range() {
        let ranges = coalesce_usage(&events(&[(10, ShaderRead), (10, ShaderWrite)]));
        assert_eq!(
            ranges,
            vec![
                UsageRange {
                    start: 10,
                    end: 10,
                    usage: ShaderRead
                },
                UsageRange {
                    start: 10,
                    end: 10,
                    usage: ShaderWrite
                },
            ]
        );
    }

    #[test]
    fn output_is_ordered_and_non_overlapping() {
        let input = events(&[
            (2, ShaderRead),
            (9, ShaderRead),
            (14, ColorTarget),
            (14, ColorTarget),
            (30, CopySource),
            (31, ShaderRead),
            (80, ShaderRead),
        ]);
        let ranges = coalesce_usage(&input);
        for pair in ranges.windows(2) {
            assert!(pair[0].start < pair[1].start);
            assert!(pair[0].end < pair[1].start);
        }
        for range in &ranges {
            assert!(range.start <= range.end);
        }
        // Output never exceeds input.
        assert!(ranges.len() <= input.len());
    }

    #[test]
    fn recoalescing_representative_samples_reproduces_boundaries() {
        // One single-event sample per emitted range reproduces the same
        // starts and kinds: adjacent ranges always differ in kind, so no
        // further merging can happen.
        let ranges = coalesce_usage(&events(&[
            (10, ShaderRead),
            (12, ShaderRead),
            (15, ShaderWrite),
            (20, ShaderWrite),
            (21, ShaderRead),
        ]));
        let samples: Vec<EventUsage> = ranges
            .iter()
            .map(|range| EventUsage::new(range.start, range.usage))
            .collect();
        let recoalesced = coalesce_usage(&samples);

        assert_eq!(recoalesced.len(), ranges.len());
        for (sample_range, original) in recoalesced.iter().zip(&ranges) {
            assert_eq!(sample_range.start, original.start);
            assert_eq!(sample_range.usage, original.usage);
        }
    }
}
