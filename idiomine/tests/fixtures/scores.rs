#![allow(unused)]
use std::fmt;

/// Sums the scores.
fn total(scores: &[u32]) -> u32 {
    let mut sum = 0;
    for score in scores {
        sum += score * 10;
    }
    sum
}
