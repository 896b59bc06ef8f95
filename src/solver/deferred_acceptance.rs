//! Variant A - college-proposing deferred acceptance with capacities.
//! Mirrors the proof-obligation style of the teacher's `rs_shuffle::native`
//! module: a plain witness-generation function (`solve_deferred_acceptance`)
//! paired with invariant-checking helpers
//! (`assert_stability_invariant`/`assert_capacity_invariant`) that a caller
//! can run as a cheap post-condition, following the teacher's
//! `build_level`/`assert_build_level_invariants` pattern.

use crate::data::UNMATCHED;

const LOG_TARGET: &str = "veilmatch::solver::deferred_acceptance";

fn pref_rank(row: &[u16], target: u16) -> Option<usize> {
    row.iter().position(|&v| v == target)
}

fn free_slots(assigned: &[u16], capacity: usize) -> usize {
    let taken = assigned.iter().filter(|&&v| v != UNMATCHED).count();
    capacity.saturating_sub(taken)
}

fn insert_student(assigned: &mut [u16], s: u16) {
    let slot = assigned
        .iter()
        .position(|&v| v == UNMATCHED)
        .expect("insert_student called on a full bag");
    assigned[slot] = s;
}

fn remove_student(assigned: &mut [u16], s: u16) {
    if let Some(slot) = assigned.iter().position(|&v| v == s) {
        assigned[slot] = UNMATCHED;
    }
}

/// Runs the main loop of spec §4.4 Variant A to a fixed point. Every loop is
/// bounded by `actual_student_list * actual_uni_list`, since each college's
/// `next_offer_index` strictly increases on every proposal it makes and
/// never exceeds `actual_student_list`.
#[tracing::instrument(target = LOG_TARGET, skip_all, fields(n_s = N_S, n_c = N_C))]
pub fn solve_deferred_acceptance<
    const N_S: usize,
    const N_C: usize,
    const MAX_PREFS: usize,
    const MAX_CAP: usize,
>(
    student_prefs: &[[u16; MAX_PREFS]; N_S],
    college_prefs: &[[u16; N_S]; N_C],
    college_capacities: &[u8; N_C],
    actual_student_list: usize,
    actual_uni_list: usize,
) -> [u16; N_S] {
    let mut current_match_c = [UNMATCHED; N_S];
    let mut assigned = [[UNMATCHED; MAX_CAP]; N_C];
    let mut next_offer_index = [0usize; N_C];

    loop {
        let mut progressed = false;

        for c in 0..actual_uni_list {
            let capacity = college_capacities[c] as usize;
            if free_slots(&assigned[c], capacity) == 0 {
                continue;
            }
            if next_offer_index[c] >= actual_student_list {
                continue;
            }

            progressed = true;
            let s = college_prefs[c][next_offer_index[c]];
            next_offer_index[c] += 1;

            if s == UNMATCHED || s as usize >= actual_student_list {
                continue;
            }
            let s_idx = s as usize;

            let Some(rank_new) = pref_rank(&student_prefs[s_idx], c as u16) else {
                continue; // student finds c unacceptable
            };

            let current = current_match_c[s_idx];
            let accepts = if current == UNMATCHED {
                true
            } else {
                let rank_current = pref_rank(&student_prefs[s_idx], current)
                    .expect("a student's current match must be in its own preference list");
                rank_new < rank_current
            };

            if accepts {
                if current != UNMATCHED {
                    remove_student(&mut assigned[current as usize], s);
                }
                insert_student(&mut assigned[c], s);
                current_match_c[s_idx] = c as u16;
            }
        }

        if !progressed {
            break;
        }
    }

    debug_assert!(
        assert_capacity_invariant(&assigned, college_capacities, actual_uni_list),
        "capacity invariant violated"
    );
    debug_assert!(
        assert_stability_invariant(
            student_prefs,
            college_prefs,
            &current_match_c,
            &assigned,
            college_capacities,
            actual_student_list,
            actual_uni_list,
        ),
        "stability invariant violated"
    );

    current_match_c
}

/// Testable property 5: `|assigned[c]| <= college_capacities[c]` for all c.
pub fn assert_capacity_invariant<const N_C: usize, const MAX_CAP: usize>(
    assigned: &[[u16; MAX_CAP]; N_C],
    college_capacities: &[u8; N_C],
    actual_uni_list: usize,
) -> bool {
    (0..actual_uni_list).all(|c| {
        let taken = assigned[c].iter().filter(|&&v| v != UNMATCHED).count();
        taken <= college_capacities[c] as usize
    })
}

/// Testable property 4: no (s, c) pair blocks the matching - if `s` prefers
/// `c` to its assignment, `c` must have no free slot and must rank every one
/// of its current students above `s`.
#[allow(clippy::too_many_arguments)]
pub fn assert_stability_invariant<
    const N_S: usize,
    const N_C: usize,
    const MAX_PREFS: usize,
    const MAX_CAP: usize,
>(
    student_prefs: &[[u16; MAX_PREFS]; N_S],
    college_prefs: &[[u16; N_S]; N_C],
    current_match_c: &[u16; N_S],
    assigned: &[[u16; MAX_CAP]; N_C],
    college_capacities: &[u8; N_C],
    actual_student_list: usize,
    actual_uni_list: usize,
) -> bool {
    for s in 0..actual_student_list {
        let own_rank = |c: u16| pref_rank(&student_prefs[s], c);
        let current = current_match_c[s];
        let current_rank = if current == UNMATCHED { None } else { own_rank(current) };

        for c in 0..actual_uni_list {
            let Some(rank_c) = own_rank(c as u16) else { continue };
            let prefers_c = match current_rank {
                None => true,
                Some(r) => rank_c < r,
            };
            if !prefers_c || current == c as u16 {
                continue;
            }

            let has_free_slot = free_slots(&assigned[c], college_capacities[c] as usize) > 0;
            if has_free_slot {
                return false;
            }

            let college_rank = |s_id: u16| pref_rank(&college_prefs[c], s_id);
            let Some(s_rank) = college_rank(s as u16) else {
                // c never even considered s; no blocking pair since c would
                // always reject s outright.
                continue;
            };
            let all_current_preferred = assigned[c]
                .iter()
                .filter(|&&v| v != UNMATCHED)
                .all(|&other| college_rank(other).map(|r| r < s_rank).unwrap_or(true));
            if !all_current_preferred {
                return false;
            }
        }
    }
    true
}
