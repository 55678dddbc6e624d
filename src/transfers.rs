use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineError;
use crate::model::{Player, Projection, Roster, MAX_PER_TEAM};

/// Knobs for the transfer search. `candidates_per_slot` is the top-N pruning
/// width per outgoing player; the pruned set is then evaluated exactly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OptimizerOptions {
    pub max_transfers: usize,
    pub allow_hits: bool,
    pub candidates_per_slot: usize,
    /// Point cost per transfer beyond the free allotment.
    pub hit_cost: f64,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            max_transfers: 2,
            allow_hits: false,
            candidates_per_slot: 3,
            hit_cost: 4.0,
        }
    }
}

/// One out/in pair. Same position on both sides so quota invariants hold by
/// construction. `price_delta` is in tenths, positive when the incoming
/// player costs more.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub out_id: u32,
    pub in_id: u32,
    /// Price of the incoming player, in tenths.
    pub in_price: u32,
    pub price_delta: i64,
    /// Projected-point gain of this pair alone over the lookahead window.
    pub gain: f64,
}

/// A candidate action: remove/add `transfers.len()` players. The empty action
/// is the no-transfer baseline, always present in the optimizer's output so
/// callers can compare against doing nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferOption {
    pub transfers: Vec<Transfer>,
    pub projected_gain: f64,
    pub hit_cost: f64,
    pub net_gain: f64,
    /// Combined price of the incoming players, the tie-breaker (prefer
    /// banking budget).
    pub total_in_price: u32,
}

impl TransferOption {
    fn baseline() -> Self {
        Self {
            transfers: Vec::new(),
            projected_gain: 0.0,
            hit_cost: 0.0,
            net_gain: 0.0,
            total_in_price: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    in_id: u32,
    in_team: u32,
    in_price: u32,
    price_delta: i64,
    gain: f64,
}

/// Searches for the roster action with the best net expected-point gain.
///
/// For k = 1..=max_transfers (k beyond the free allotment only when hits are
/// allowed), every combination of k outgoing players is paired with its
/// pruned candidate replacements and evaluated exactly against budget and
/// the per-team cap. Returns the baseline plus the best action per k that
/// beats it, sorted by net gain descending. Finding nothing feasible is not
/// an error: the list then holds only the baseline.
pub fn recommend_transfers(
    roster: &Roster,
    players: &[Player],
    projections: &HashMap<u32, Projection>,
    opts: &OptimizerOptions,
) -> Result<Vec<TransferOption>, EngineError> {
    let by_id: HashMap<u32, Player> = players.iter().map(|p| (p.id, p.clone())).collect();
    roster.validate(&by_id)?;

    let owned: HashSet<u32> = roster.player_ids.iter().copied().collect();
    let expected = |id: u32| projections.get(&id).map(|p| p.expected_points).unwrap_or(0.0);

    // Pruned replacement shortlist per squad member: same position, not
    // owned, affordable against bank + sale value, top-N by expected points.
    let mut shortlists: HashMap<u32, Vec<Candidate>> = HashMap::new();
    for out_id in &roster.player_ids {
        let out = &by_id[out_id];
        let budget = i64::from(roster.bank) + i64::from(out.price);
        let mut list: Vec<Candidate> = players
            .iter()
            .filter(|p| p.position == out.position && !owned.contains(&p.id))
            .filter(|p| i64::from(p.price) <= budget)
            .map(|p| Candidate {
                in_id: p.id,
                in_team: p.team_id,
                in_price: p.price,
                price_delta: i64::from(p.price) - i64::from(out.price),
                gain: expected(p.id) - expected(*out_id),
            })
            .collect();
        list.sort_by(|a, b| {
            b.gain
                .total_cmp(&a.gain)
                .then(a.in_price.cmp(&b.in_price))
        });
        list.truncate(opts.candidates_per_slot);
        if !list.is_empty() {
            shortlists.insert(*out_id, list);
        }
    }

    let team_counts = roster.team_counts(&by_id);
    let outs_with_options: Vec<u32> = roster
        .player_ids
        .iter()
        .copied()
        .filter(|id| shortlists.contains_key(id))
        .collect();

    let mut options = vec![TransferOption::baseline()];
    for k in 1..=opts.max_transfers {
        let free = roster.free_transfers as usize;
        if k > free && !opts.allow_hits {
            break;
        }
        let hit_cost = opts.hit_cost * k.saturating_sub(free) as f64;
        let mut best: Option<TransferOption> = None;
        for_each_combination(&outs_with_options, k, &mut |outs| {
            evaluate_out_set(
                outs,
                &by_id,
                &shortlists,
                &team_counts,
                i64::from(roster.bank),
                hit_cost,
                &mut best,
            );
        });
        if let Some(option) = best {
            if option.net_gain > 0.0 {
                options.push(option);
            }
        }
    }

    options.sort_by(|a, b| {
        b.net_gain
            .total_cmp(&a.net_gain)
            .then(a.total_in_price.cmp(&b.total_in_price))
    });
    debug!(options = options.len(), "transfer search finished");
    Ok(options)
}

/// Exact evaluation of one outgoing set: walk the cross product of the
/// shortlists, enforcing distinct incomers and the team cap along the way
/// and the budget at the leaf.
fn evaluate_out_set(
    outs: &[u32],
    by_id: &HashMap<u32, Player>,
    shortlists: &HashMap<u32, Vec<Candidate>>,
    base_team_counts: &HashMap<u32, usize>,
    bank: i64,
    hit_cost: f64,
    best: &mut Option<TransferOption>,
) {
    // Club headcounts after the outgoing players leave.
    let mut counts = base_team_counts.clone();
    for out_id in outs {
        if let Some(c) = counts.get_mut(&by_id[out_id].team_id) {
            *c -= 1;
        }
    }

    let mut picked: Vec<Transfer> = Vec::with_capacity(outs.len());
    walk(outs, 0, shortlists, &mut counts, bank, &mut picked, hit_cost, best);
}

#[allow(clippy::too_many_arguments)]
fn walk(
    outs: &[u32],
    depth: usize,
    shortlists: &HashMap<u32, Vec<Candidate>>,
    counts: &mut HashMap<u32, usize>,
    bank: i64,
    picked: &mut Vec<Transfer>,
    hit_cost: f64,
    best: &mut Option<TransferOption>,
) {
    if depth == outs.len() {
        // The budget binds the combined delta only: a pricier buy can be
        // funded by a sale elsewhere in the same action.
        let total_delta: i64 = picked.iter().map(|t| t.price_delta).sum();
        if total_delta > bank {
            return;
        }
        let projected_gain: f64 = picked.iter().map(|t| t.gain).sum();
        let net_gain = projected_gain - hit_cost;
        let total_in_price: u32 = picked.iter().map(|t| t.in_price).sum();
        let better = match best {
            None => true,
            Some(b) => {
                net_gain > b.net_gain + 1e-9
                    || ((net_gain - b.net_gain).abs() <= 1e-9 && total_in_price < b.total_in_price)
            }
        };
        if better {
            *best = Some(TransferOption {
                transfers: picked.clone(),
                projected_gain,
                hit_cost,
                net_gain,
                total_in_price,
            });
        }
        return;
    }

    let out_id = outs[depth];
    for cand in &shortlists[&out_id] {
        if picked.iter().any(|t| t.in_id == cand.in_id) {
            continue;
        }
        let club = counts.entry(cand.in_team).or_insert(0);
        if *club >= MAX_PER_TEAM {
            continue;
        }
        *club += 1;
        picked.push(Transfer {
            out_id,
            in_id: cand.in_id,
            in_price: cand.in_price,
            price_delta: cand.price_delta,
            gain: cand.gain,
        });
        walk(outs, depth + 1, shortlists, counts, bank, picked, hit_cost, best);
        picked.pop();
        if let Some(c) = counts.get_mut(&cand.in_team) {
            *c -= 1;
        }
    }
}

/// Calls `f` for every k-combination of `items`, in index order.
fn for_each_combination(items: &[u32], k: usize, f: &mut impl FnMut(&[u32])) {
    if k == 0 || k > items.len() {
        return;
    }
    let mut buf: Vec<u32> = Vec::with_capacity(k);
    fn rec(items: &[u32], k: usize, start: usize, buf: &mut Vec<u32>, f: &mut impl FnMut(&[u32])) {
        if buf.len() == k {
            f(buf);
            return;
        }
        let needed = k - buf.len();
        for i in start..=items.len().saturating_sub(needed) {
            buf.push(items[i]);
            rec(items, k, i + 1, buf, f);
            buf.pop();
        }
    }
    rec(items, k, 0, &mut buf, f);
}
