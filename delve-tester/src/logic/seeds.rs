use anyhow::{Context, Result, bail};
use std::collections::HashSet;

const DEFAULT_SEED: u64 = 1337;
const MAX_RANGE_SEEDS: u64 = 10_000;

/// Resolve CLI seed tokens into an ordered, de-duplicated seed list.
///
/// Accepts literal integers (negative values use their magnitude) and
/// ranges written `start..end` or `start..=end`.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds = Vec::new();
    let mut seen = HashSet::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }
        for seed in parse_token(token)? {
            if seen.insert(seed) {
                seeds.push(seed);
            }
        }
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
    }
    Ok(seeds)
}

fn parse_token(token: &str) -> Result<Vec<u64>> {
    if let Some((start, end)) = token.split_once("..") {
        let (end, inclusive) = match end.strip_prefix('=') {
            Some(end) => (end, true),
            None => (end, false),
        };
        let start: u64 = start
            .trim()
            .parse()
            .with_context(|| format!("invalid range start in seed token {token}"))?;
        let end: u64 = end
            .trim()
            .parse()
            .with_context(|| format!("invalid range end in seed token {token}"))?;
        let end = if inclusive { end.saturating_add(1) } else { end };
        if end <= start {
            bail!("Empty seed range: {token}");
        }
        if end - start > MAX_RANGE_SEEDS {
            bail!("Seed range {token} exceeds {MAX_RANGE_SEEDS} seeds");
        }
        return Ok((start..end).collect());
    }

    if let Ok(value) = token.parse::<i64>() {
        return Ok(vec![value.unsigned_abs()]);
    }
    if let Ok(value) = token.parse::<u64>() {
        return Ok(vec![value]);
    }
    bail!("Unrecognized seed token: {token}");
}
