//! Turn loop shared by local and networked matches.

use log::{debug, info, warn};

use crate::game::{Match, MatchStatus, MoveRejection, Resolution, Side};
use crate::player::{GameOutcome, IdleEvent, Player, ShotNotice, Turn};

enum Action {
    Turn(anyhow::Result<Turn>),
    Idle(anyhow::Result<IdleEvent>),
}

fn seats<'a>(
    side: Side,
    first: &'a mut dyn Player,
    second: &'a mut dyn Player,
) -> (&'a mut dyn Player, &'a mut dyn Player) {
    match side {
        Side::First => (first, second),
        Side::Second => (second, first),
    }
}

fn name_of(side: Side, first: &dyn Player, second: &dyn Player) -> String {
    match side {
        Side::First => first.name().to_string(),
        Side::Second => second.name().to_string(),
    }
}

/// Drive `game` to completion with `first` and `second` in their seats.
///
/// Only the side holding the turn is asked for a move. A move from the
/// waiting side is refused with `MoveRejection::Late` and changes nothing.
/// Exits, disconnects and invalid shots abort the match and both players
/// receive a game over without a winner.
pub async fn play<'a>(
    game: &mut Match,
    first: &'a mut dyn Player,
    second: &'a mut dyn Player,
) -> anyhow::Result<MatchStatus> {
    info!("Match {} vs {} started", first.name(), second.name());
    loop {
        let side = game.turn();
        let (current, waiting) = seats(side, &mut *first, &mut *second);
        let action = {
            let view = game.view(side);
            tokio::select! {
                turn = current.next_move(view) => Action::Turn(turn),
                event = waiting.idle() => Action::Idle(event),
            }
        };

        let coord = match action {
            Action::Turn(Ok(Turn::Fire(c))) => c,
            Action::Turn(Ok(Turn::Exit)) => {
                info!("{} left the match", current.name());
                return abort(game, first, second).await;
            }
            Action::Turn(Err(e)) => {
                warn!("{} failed to move: {}", current.name(), e);
                return abort(game, first, second).await;
            }
            Action::Idle(Ok(IdleEvent::LateMove)) => {
                debug!("{} moved out of turn", waiting.name());
                if let Err(e) = waiting.move_rejected(&MoveRejection::Late).await {
                    warn!("{}: {}", waiting.name(), e);
                    return abort(game, first, second).await;
                }
                continue;
            }
            Action::Idle(Ok(IdleEvent::Exit)) => {
                info!("{} left the match", waiting.name());
                return abort(game, first, second).await;
            }
            Action::Idle(Err(e)) => {
                warn!("{}: {}", waiting.name(), e);
                return abort(game, first, second).await;
            }
        };

        let resolution = match game.fire(side, coord) {
            Ok(resolution) => resolution,
            Err(MoveRejection::Late) => {
                // the engine disagrees about whose turn it is; ask again
                let _ = current.move_rejected(&MoveRejection::Late).await;
                continue;
            }
            Err(rejection) => {
                warn!("{}: {}", current.name(), rejection);
                let _ = current.move_rejected(&rejection).await;
                return abort(game, first, second).await;
            }
        };
        debug!(
            "{} fired at {}: {:?}",
            current.name(),
            resolution.coord,
            resolution.outcome
        );

        if let Err(e) = notify(&resolution, first, second).await {
            warn!("Notification failed: {}", e);
            return abort(game, first, second).await;
        }

        if resolution.game_over {
            let winner = name_of(resolution.shooter, &*first, &*second);
            info!("{} won the match", winner);
            for (player, side) in [(&mut *first, Side::First), (&mut *second, Side::Second)] {
                let outcome = GameOutcome {
                    winner: Some(winner.clone()),
                    won: side == resolution.shooter,
                };
                if let Err(e) = player.game_over(&outcome).await {
                    warn!("{}: {}", player.name(), e);
                }
            }
            return Ok(game.status());
        }
    }
}

async fn notify<'a>(
    resolution: &Resolution,
    first: &'a mut dyn Player,
    second: &'a mut dyn Player,
) -> anyhow::Result<()> {
    let shooter = name_of(resolution.shooter, &*first, &*second);
    let next = name_of(resolution.next, &*first, &*second);
    for (player, side) in [(first, Side::First), (second, Side::Second)] {
        let notice = ShotNotice {
            coord: resolution.coord,
            hit: resolution.outcome.is_hit(),
            sunk: resolution.outcome.is_sunk(),
            game_over: resolution.game_over,
            shooter: shooter.clone(),
            next: next.clone(),
            own_shot: side == resolution.shooter,
            my_turn: side == resolution.next,
        };
        player.shot_resolved(&notice).await?;
    }
    Ok(())
}

async fn abort(
    game: &mut Match,
    first: &mut dyn Player,
    second: &mut dyn Player,
) -> anyhow::Result<MatchStatus> {
    game.abort();
    let outcome = GameOutcome::aborted();
    // the side that left is usually gone already
    let _ = first.game_over(&outcome).await;
    let _ = second.game_over(&outcome).await;
    info!("Match aborted");
    Ok(game.status())
}
