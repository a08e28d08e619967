/// One candidate line offered to a worker: a non-protected event with
/// extractable text at or above the content-extraction threshold (spec
/// §4.3.2 step 2, default 200 chars).
#[derive(Debug, Clone)]
pub struct CandidateLine {
    pub line_number: usize,
    pub length: usize,
    pub kind_label: String,
    pub preview: String,
}

/// Default per-worker chunk size (spec §4.3.2).
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Split candidates into chunks of `chunk_size` in original order (spec
/// §4.3.2 step 3). The last chunk may be shorter.
pub fn partition(candidates: Vec<CandidateLine>, chunk_size: usize) -> Vec<Vec<CandidateLine>> {
    if chunk_size == 0 {
        return vec![candidates];
    }
    candidates
        .chunks(chunk_size.max(1))
        .map(|c| c.to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> CandidateLine {
        CandidateLine { line_number: n, length: 300, kind_label: "tool_result".into(), preview: "x".into() }
    }

    #[test]
    fn partitions_in_order() {
        let candidates: Vec<_> = (0..250).map(line).collect();
        let chunks = partition(candidates, 100);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 100);
        assert_eq!(chunks[2].len(), 50);
        assert_eq!(chunks[0][0].line_number, 0);
        assert_eq!(chunks[2][0].line_number, 200);
    }
}
