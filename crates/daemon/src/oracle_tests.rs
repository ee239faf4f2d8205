// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use yare::parameterized;

use super::{parse_verdict, DecisionOracle, NullOracle, Verdict};

#[parameterized(
    bare = { "BLOCK", Verdict::Block },
    lowercase = { "block", Verdict::Block },
    mixed = { "Block", Verdict::Block },
    sentence = { "I would BLOCK this window.", Verdict::Block },
    embedded = { "verdict: blocked", Verdict::Block },
    allow = { "ALLOW", Verdict::Allow },
    chatty = { "This looks aligned with the purpose.", Verdict::Allow },
    empty = { "", Verdict::Allow },
)]
fn verdict_parsing(text: &str, expected: Verdict) {
    assert_eq!(parse_verdict(text), expected);
}

#[tokio::test]
async fn null_oracle_always_allows() -> anyhow::Result<()> {
    let oracle = NullOracle;
    let verdict = oracle.decide("write paper", "firefox", "YouTube").await?;
    assert_eq!(verdict, Verdict::Allow);
    Ok(())
}
