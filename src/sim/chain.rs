//! Sector chain and passive abilities
//!
//! Every obstacle pass closes a sector. The taps tallied inside it decide
//! whether the chain holds (`Linked`) or snaps (`Broken`), and a held chain
//! feeds the score multiplier and the passives.

use super::environment::sync_from_score;
use super::events::{EventKind, PassiveKind, ScoreSource};
use super::state::{RunState, SectorTally, SectorVerdict};

/// Verdict for a tally under the current grace timers
pub fn judge_sector(state: &RunState, tally: &SectorTally) -> SectorVerdict {
    let chain = &state.tuning.chain;
    let anchor_active = state.chain.anchor_stability_timer > 0.0;
    let enough_perfect =
        tally.perfect >= chain.linked_perfect_required || state.sync.recent_perfect_timer > 0.0;
    let offbeat_limit = chain.broken_offbeat_threshold + u32::from(anchor_active);

    if enough_perfect && tally.offbeat <= offbeat_limit {
        SectorVerdict::Linked
    } else {
        SectorVerdict::Broken
    }
}

/// Close the current sector: update the chain, fire passives, award score
pub fn resolve_sector(state: &mut RunState) -> SectorVerdict {
    let tuning = state.tuning.clone();
    let tally = state.chain.sector;
    let verdict = judge_sector(state, &tally);

    match verdict {
        SectorVerdict::Linked => {
            let chain = &mut state.chain;
            chain.streak += 1;
            chain.best_streak = chain.best_streak.max(chain.streak);
            chain.linked_sectors += 1;
            chain.linked_since_shield += 1;
            chain.multiplier = (1.0
                + (chain.streak - 1) as f32 * tuning.chain.multiplier_per_linked_sector)
                .clamp(1.0, tuning.chain.multiplier_max.max(1.0));

            if chain.linked_since_shield >= tuning.passives.shield.linked_every.max(1) {
                chain.linked_since_shield = 0;
                grant_shield(state);
            }
            if state.chain.streak >= tuning.passives.gap.streak_threshold {
                activate_gap(state);
            }
        }
        SectorVerdict::Broken => {
            let previous = state.chain.streak;
            if previous > 0 {
                log::debug!("Chain broken at streak {}", previous);
                state.emit(EventKind::ChainBreak { streak: previous });
            }
            let chain = &mut state.chain;
            chain.streak = 0;
            chain.multiplier = 1.0;
            chain.linked_since_shield = 0;
        }
    }
    state.chain.total_sectors += 1;
    state.chain.last_verdict = Some(verdict);

    if verdict == SectorVerdict::Linked
        && tally.perfect >= tuning.sync.sector_perfect_for_flux
        && tally.offbeat == 0
    {
        activate_flux(state);
    }

    let anchor_bonus = if state.chain.anchor_stability_timer > 0.0 {
        tuning.chain.anchor_multiplier_bonus
    } else {
        0.0
    };
    let multiplier = state.chain.multiplier + anchor_bonus;
    let raw = tuning.chain.base_sector_score * multiplier;
    let gain = raw.round().max(1.0) as u64;
    let source = match verdict {
        SectorVerdict::Linked => ScoreSource::LinkedSector,
        SectorVerdict::Broken => ScoreSource::BrokenSector,
    };
    award_score(state, gain, source);

    log::debug!(
        "Sector {:?}: +{} x{:.2} (P{} S{} O{})",
        verdict,
        gain,
        multiplier,
        tally.perfect,
        tally.sync,
        tally.offbeat
    );
    state.emit(EventKind::SectorResolved {
        verdict,
        gain,
        multiplier,
        perfect_taps: tally.perfect,
        sync_taps: tally.sync,
        offbeat_taps: tally.offbeat,
    });
    state.chain.sector = SectorTally::default();

    verdict
}

/// Add score and let the environment catch up
pub fn award_score(state: &mut RunState, amount: u64, source: ScoreSource) {
    state.score = state.score.saturating_add(amount);
    let score = state.score;
    state.emit(EventKind::ScoreGain { amount, source, score });
    sync_from_score(state, false);
}

/// One more shield charge, up to the cap
pub fn grant_shield(state: &mut RunState) -> bool {
    let max = state.tuning.passives.shield.max_charges;
    if state.passives.shield_charges >= max {
        return false;
    }
    state.passives.shield_charges += 1;
    let charges = state.passives.shield_charges;
    log::debug!("Shield charge granted ({}/{})", charges, max);
    state.emit(EventKind::PassiveTrigger {
        passive: PassiveKind::Shield,
        charges: Some(charges),
    });
    true
}

/// Widen upcoming gaps unless the passive is cooling down
pub fn activate_gap(state: &mut RunState) -> bool {
    if state.passives.gap_cooldown > 0.0 {
        return false;
    }
    let gap = &state.tuning.passives.gap;
    state.passives.gap_timer = gap.duration;
    state.passives.gap_cooldown = gap.cooldown;
    log::debug!("Gap widen for {:.1}s", gap.duration);
    state.emit(EventKind::PassiveTrigger { passive: PassiveKind::Gap, charges: None });
    true
}

/// Push the player forward and soften gravity unless cooling down
pub fn activate_flux(state: &mut RunState) -> bool {
    if state.passives.flux_cooldown > 0.0 {
        return false;
    }
    let flux = &state.tuning.passives.flux;
    state.passives.flux_timer = flux.duration;
    state.passives.flux_cooldown = flux.cooldown;
    state.player.vel.x = state.player.vel.x.max(flux.push);
    state.player.vel.y *= flux.vy_damping;
    log::debug!("Flux boost for {:.1}s", flux.duration);
    state.emit(EventKind::PassiveTrigger { passive: PassiveKind::Flux, charges: None });
    true
}
