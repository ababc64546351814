use crate::engine::OcrEngine;
use crate::error::{OcrError, Result};
use netsketch_model::{FragmentId, OcrRegion, RegionKey, TextFragment};
use std::collections::{BTreeMap, HashSet};
use std::ops::Range;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Retained fragments per OCR region, in image coordinates.
///
/// Every submitted region has an entry, possibly empty.
pub type Recognized = BTreeMap<RegionKey, Vec<TextFragment>>;

/// Split `0..len` into `shards` contiguous ranges.
///
/// Sizes differ by at most one, larger shards first. Membership depends only
/// on `len` and `shards`.
#[must_use]
pub fn shard_ranges(len: usize, shards: usize) -> Vec<Range<usize>> {
    let shards = shards.max(1);
    let base = len / shards;
    let extra = len % shards;

    let mut ranges = Vec::with_capacity(shards);
    let mut start = 0;
    for shard in 0..shards {
        let size = base + usize::from(shard < extra);
        ranges.push(start..start + size);
        start += size;
    }
    ranges
}

/// Fans OCR out over a fixed number of blocking workers.
///
/// Each worker owns a contiguous shard of the regions and builds its own
/// result map. All workers are awaited before anything is returned; there is
/// no cancellation, so a failing shard does not stop the others.
pub struct ShardedRecognizer {
    engine: Arc<dyn OcrEngine>,
    shards: usize,
    min_confidence: f64,
}

impl ShardedRecognizer {
    pub fn new(engine: Arc<dyn OcrEngine>, shards: usize, min_confidence: f64) -> Self {
        Self {
            engine,
            shards: shards.max(1),
            min_confidence,
        }
    }

    pub fn shards(&self) -> usize {
        self.shards
    }

    /// Recognize every region and merge the shard maps.
    ///
    /// Fails on duplicate region keys before any work starts. After the
    /// barrier, the error of the lowest-numbered failing shard wins; worker
    /// panics are reported after engine errors.
    pub async fn recognize_all(&self, regions: Vec<OcrRegion>) -> Result<Recognized> {
        let mut seen = HashSet::with_capacity(regions.len());
        for region in &regions {
            if !seen.insert(region.key) {
                return Err(OcrError::DuplicateRegion(region.key));
            }
        }

        let expected = regions.len();
        let regions: Arc<[OcrRegion]> = regions.into();
        let mut workers = JoinSet::new();
        let mut spawned = 0;
        for (shard, range) in shard_ranges(expected, self.shards).into_iter().enumerate() {
            if range.is_empty() {
                continue;
            }
            let engine = Arc::clone(&self.engine);
            let regions = Arc::clone(&regions);
            let min_confidence = self.min_confidence;
            workers.spawn_blocking(move || {
                let result = recognize_shard(engine.as_ref(), &regions[range], min_confidence);
                (shard, result)
            });
            spawned += 1;
        }

        let mut maps = Vec::new();
        let mut failures: Vec<(usize, OcrError)> = Vec::new();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((_, Ok(map))) => maps.push(map),
                Ok((shard, Err(err))) => {
                    log::warn!("OCR shard {shard} failed: {err}");
                    failures.push((shard, err));
                }
                Err(err) => failures.push((usize::MAX, OcrError::WorkerPanic(err.to_string()))),
            }
        }
        if let Some((_, err)) = failures.into_iter().min_by_key(|(shard, _)| *shard) {
            return Err(err);
        }

        let mut merged = Recognized::new();
        let mut actual = 0;
        for map in maps {
            actual += map.len();
            merged.extend(map);
        }
        if actual != expected || merged.len() != expected {
            return Err(OcrError::MergeMismatch { expected, actual });
        }

        let kept: usize = merged.values().map(Vec::len).sum();
        log::info!(
            "Recognized {expected} regions with {spawned} workers: {kept} fragments kept"
        );
        Ok(merged)
    }
}

/// Run the engine over one shard, translating quads into image coordinates
/// and dropping low-confidence or blank readings
fn recognize_shard(
    engine: &dyn OcrEngine,
    regions: &[OcrRegion],
    min_confidence: f64,
) -> Result<Recognized> {
    let mut out = Recognized::new();
    for region in regions {
        let origin = region.bbox.origin();
        let readings = engine.recognize(region)?;
        let mut fragments = Vec::with_capacity(readings.len());
        for (index, reading) in readings.into_iter().enumerate() {
            reading.validate()?;
            let text = reading.text.trim();
            if text.is_empty() || reading.confidence < min_confidence {
                log::debug!(
                    "Dropping reading {:?} in {} (confidence {:.2})",
                    reading.text,
                    region.key,
                    reading.confidence
                );
                continue;
            }
            fragments.push(TextFragment {
                id: FragmentId {
                    region: region.key,
                    index: u32::try_from(index).unwrap_or(u32::MAX),
                },
                text: text.to_string(),
                confidence: reading.confidence,
                quad: reading.quad.map(|p| p.offset(origin)),
                class: None,
            });
        }
        out.insert(region.key, fragments);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn splits_like_three_workers() {
        assert_eq!(shard_ranges(7, 3), vec![0..3, 3..5, 5..7]);
        assert_eq!(shard_ranges(2, 3), vec![0..1, 1..2, 2..2]);
        assert_eq!(shard_ranges(0, 3), vec![0..0, 0..0, 0..0]);
        assert_eq!(shard_ranges(5, 0), vec![0..5]);
    }

    proptest! {
        #[test]
        fn proptest_ranges_partition_input(len in 0usize..500, shards in 1usize..16) {
            let ranges = shard_ranges(len, shards);
            prop_assert_eq!(ranges.len(), shards);

            let mut next = 0;
            for range in &ranges {
                prop_assert_eq!(range.start, next);
                next = range.end;
            }
            prop_assert_eq!(next, len);

            let sizes: Vec<usize> = ranges.iter().map(|r| r.len()).collect();
            let max = sizes.iter().copied().max().unwrap_or(0);
            let min = sizes.iter().copied().min().unwrap_or(0);
            prop_assert!(max - min <= 1);
        }
    }
}
