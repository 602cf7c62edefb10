use std::str::FromStr;

/// Which episodes of a series to process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeSelection {
    All,
    /// Inclusive, 1-based
    Range(usize, usize),
    /// 1-based
    Single(usize),
}

impl FromStr for EpisodeSelection {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();

        if input.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }

        if let Some((start, end)) = input.split_once('-') {
            let start = start
                .trim()
                .parse()
                .map_err(|_| format!("Invalid range start: '{}'", start))?;
            let end = end
                .trim()
                .parse()
                .map_err(|_| format!("Invalid range end: '{}'", end))?;
            return Ok(Self::Range(start, end));
        }

        input
            .parse()
            .map(Self::Single)
            .map_err(|_| format!("Invalid episode number: '{}'", input))
    }
}

impl EpisodeSelection {
    /// 0-based indices into a listing of `len` episodes; out-of-range entries are dropped
    pub fn indices(&self, len: usize) -> Vec<usize> {
        let (start, end) = match *self {
            Self::All => return (0..len).collect(),
            Self::Range(start, end) => (start, end),
            Self::Single(n) => (n, n),
        };

        (start.max(1)..=end)
            .map(|n| n - 1)
            .filter(|&i| i < len)
            .collect()
    }
}
