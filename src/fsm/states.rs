//! Concrete mode handler functions and table builder.
//!
//! Each mode is a row of plain `fn` pointers: no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!  MAIN VIEW ──[any press]──▶ MAIN MENU ──[Games]──▶ GAME MENU ──[enter]──▶ DODGE / MEMORY / TICTACTOE
//!     ▲  ▲                      │   │                                              │
//!     │  │                 [Shop]   [timeout]                                  [game over]
//!     │  │                      ▼                                                  ▼
//!     │  └──[bought / timeout]─ SHOP MENU                         MAIN VIEW ◀── GAME RESULT (3 s)
//!     │
//!     └──[woke up]── SLEEPING ◀──[pet asleep, from main view or any menu]
//! ```

use log::{debug, info};

use super::context::{AppContext, MainMenuItem};
use super::{ModeDescriptor, ModeId};
use crate::app::events::{AppEvent, AudioCue};
use crate::events::{ButtonId, Press};
use crate::games::memory::{InputOutcome, Symbol};
use crate::games::{GameKind, GameSummary};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static mode table.  Called once at startup.
pub fn build_mode_table() -> [ModeDescriptor; ModeId::COUNT] {
    [
        // Index 0: MainView
        ModeDescriptor {
            id: ModeId::MainView,
            name: "MainView",
            on_enter: None,
            on_exit: None,
            on_update: main_view_update,
            on_press: main_view_press,
            on_down: None,
        },
        // Index 1: MainMenu
        ModeDescriptor {
            id: ModeId::MainMenu,
            name: "MainMenu",
            on_enter: Some(main_menu_enter),
            on_exit: None,
            on_update: menu_update,
            on_press: main_menu_press,
            on_down: Some(touch_menu),
        },
        // Index 2: GameMenu
        ModeDescriptor {
            id: ModeId::GameMenu,
            name: "GameMenu",
            on_enter: Some(game_menu_enter),
            on_exit: None,
            on_update: menu_update,
            on_press: game_menu_press,
            on_down: Some(touch_menu),
        },
        // Index 3: ShopMenu
        ModeDescriptor {
            id: ModeId::ShopMenu,
            name: "ShopMenu",
            on_enter: Some(shop_menu_enter),
            on_exit: None,
            on_update: menu_update,
            on_press: shop_menu_press,
            on_down: Some(touch_menu),
        },
        // Index 4: Dodge
        ModeDescriptor {
            id: ModeId::Dodge,
            name: "Dodge",
            on_enter: Some(dodge_enter),
            on_exit: None,
            on_update: dodge_update,
            on_press: dodge_press,
            on_down: None,
        },
        // Index 5: Memory
        ModeDescriptor {
            id: ModeId::Memory,
            name: "Memory",
            on_enter: Some(memory_enter),
            on_exit: None,
            on_update: memory_update,
            on_press: memory_press,
            on_down: Some(memory_down),
        },
        // Index 6: TicTacToe
        ModeDescriptor {
            id: ModeId::TicTacToe,
            name: "TicTacToe",
            on_enter: Some(tictactoe_enter),
            on_exit: None,
            on_update: tictactoe_update,
            on_press: tictactoe_press,
            on_down: None,
        },
        // Index 7: GameResult
        ModeDescriptor {
            id: ModeId::GameResult,
            name: "GameResult",
            on_enter: Some(game_result_enter),
            on_exit: Some(game_result_exit),
            on_update: game_result_update,
            on_press: ignore_press,
            on_down: None,
        },
        // Index 8: Sleeping
        ModeDescriptor {
            id: ModeId::Sleeping,
            name: "Sleeping",
            on_enter: None,
            on_exit: None,
            on_update: sleeping_update,
            on_press: sleeping_press,
            on_down: None,
        },
    ]
}

fn ignore_press(_ctx: &mut AppContext, press: Press) -> Option<ModeId> {
    debug!("press ignored: {:?}", press);
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  MAIN VIEW
// ═══════════════════════════════════════════════════════════════════════════

fn main_view_update(ctx: &mut AppContext) -> Option<ModeId> {
    ctx.pet.is_sleeping().then_some(ModeId::Sleeping)
}

fn main_view_press(ctx: &mut AppContext, _press: Press) -> Option<ModeId> {
    ctx.cue(AudioCue::Beep);
    Some(ModeId::MainMenu)
}

// ═══════════════════════════════════════════════════════════════════════════
//  Menus (shared)
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nav {
    Prev,
    Next,
    Commit,
}

fn nav(press: Press) -> Nav {
    if press.is_long() {
        Nav::Commit
    } else if press.button == ButtonId::Left {
        Nav::Prev
    } else {
        Nav::Next
    }
}

fn step(idx: usize, len: usize, nav: Nav) -> usize {
    if len == 0 {
        return 0;
    }
    match nav {
        Nav::Prev => (idx + len - 1) % len,
        Nav::Next => (idx + 1) % len,
        Nav::Commit => idx.min(len - 1),
    }
}

fn touch_menu(ctx: &mut AppContext) {
    ctx.menu_activity_at = ctx.now;
}

fn menu_update(ctx: &mut AppContext) -> Option<ModeId> {
    if ctx.pet.is_sleeping() {
        return Some(ModeId::Sleeping);
    }
    let idle = ctx.now.saturating_sub(ctx.menu_activity_at);
    if idle >= u64::from(ctx.config.menu_timeout_ms) {
        info!("menu closed after {} ms without input", idle);
        return Some(ModeId::MainView);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  MAIN MENU
// ═══════════════════════════════════════════════════════════════════════════

fn main_menu_enter(ctx: &mut AppContext) {
    ctx.menus.main = 0;
    touch_menu(ctx);
}

fn main_menu_press(ctx: &mut AppContext, press: Press) -> Option<ModeId> {
    touch_menu(ctx);
    let items = MainMenuItem::ALL;
    let action = nav(press);
    ctx.menus.main = step(ctx.menus.main, items.len(), action);
    if action != Nav::Commit {
        ctx.cue(AudioCue::Beep);
        return None;
    }

    let now = ctx.now;
    match items[ctx.menus.main] {
        MainMenuItem::Feed => {
            ctx.pet.feed(now);
            Some(ModeId::MainView)
        }
        MainMenuItem::Shop => Some(ModeId::ShopMenu),
        MainMenuItem::Games => Some(ModeId::GameMenu),
        MainMenuItem::Sleep => {
            if ctx.pet.sleep(now) {
                Some(ModeId::Sleeping)
            } else {
                Some(ModeId::MainView)
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  GAME MENU
// ═══════════════════════════════════════════════════════════════════════════

fn game_menu_enter(ctx: &mut AppContext) {
    ctx.menus.games = 0;
    touch_menu(ctx);
}

fn game_menu_press(ctx: &mut AppContext, press: Press) -> Option<ModeId> {
    touch_menu(ctx);
    let items = ctx.game_menu_items();
    let action = nav(press);
    ctx.menus.games = step(ctx.menus.games, items.len(), action);
    if action != Nav::Commit {
        ctx.cue(AudioCue::Beep);
        return None;
    }

    let kind = items.get(ctx.menus.games).copied().unwrap_or(GameKind::Dodge);
    if !ctx.pet.play() {
        debug!("{} not started: pet cannot play", kind.name());
        return Some(ModeId::MainView);
    }
    info!("starting {}", kind.name());
    Some(game_mode(kind))
}

fn game_mode(kind: GameKind) -> ModeId {
    match kind {
        GameKind::Dodge => ModeId::Dodge,
        GameKind::Memory => ModeId::Memory,
        GameKind::TicTacToe => ModeId::TicTacToe,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  SHOP MENU
// ═══════════════════════════════════════════════════════════════════════════

fn shop_menu_enter(ctx: &mut AppContext) {
    ctx.menus.shop = 0;
    touch_menu(ctx);
}

fn shop_menu_press(ctx: &mut AppContext, press: Press) -> Option<ModeId> {
    touch_menu(ctx);
    let items = ctx.shop_menu_items();
    let action = nav(press);
    ctx.menus.shop = step(ctx.menus.shop, items.len(), action);
    if action != Nav::Commit {
        ctx.cue(AudioCue::Beep);
        return None;
    }

    let item = items.get(ctx.menus.shop).copied()?;
    let now = ctx.now;
    if ctx.pet.purchase(item, now) {
        ctx.event(AppEvent::Purchased(item));
        Some(ModeId::MainView)
    } else {
        info!("purchase of {} refused ({} coins)", item.label(), ctx.pet.coins());
        ctx.event(AppEvent::PurchaseRejected(item));
        None
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Games (shared)
// ═══════════════════════════════════════════════════════════════════════════

/// Record the payout and hand over to the result screen.  Records are
/// written when the controller persists this step.
fn end_game(ctx: &mut AppContext, summary: GameSummary) -> Option<ModeId> {
    info!(
        "{} over: {:?}, {} coins",
        summary.kind.name(),
        summary.outcome,
        summary.coins
    );
    ctx.last_game = Some(summary);
    ctx.pending_finish = Some(summary.kind);
    Some(ModeId::GameResult)
}

// ═══════════════════════════════════════════════════════════════════════════
//  DODGE
// ═══════════════════════════════════════════════════════════════════════════

fn dodge_enter(ctx: &mut AppContext) {
    ctx.active_game = GameKind::Dodge;
    ctx.dodge.reset(ctx.now);
}

fn dodge_update(ctx: &mut AppContext) -> Option<ModeId> {
    let now = ctx.now;
    ctx.dodge.update(now, &mut ctx.rng);
    if ctx.dodge.is_over() {
        ctx.cue(AudioCue::Error);
        let summary = GameSummary::dodge(ctx.dodge.level());
        return end_game(ctx, summary);
    }
    None
}

fn dodge_press(ctx: &mut AppContext, press: Press) -> Option<ModeId> {
    match press.button {
        ButtonId::Left => ctx.dodge.move_left(),
        ButtonId::Right => ctx.dodge.move_right(),
        ButtonId::Action if press.is_long() => {
            let summary = GameSummary::dodge(ctx.dodge.level());
            return end_game(ctx, summary);
        }
        ButtonId::Action => ctx.dodge.cycle_lane(),
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  MEMORY
// ═══════════════════════════════════════════════════════════════════════════

fn memory_enter(ctx: &mut AppContext) {
    ctx.active_game = GameKind::Memory;
    let now = ctx.now;
    ctx.memory.start(now, &mut ctx.rng);
}

fn memory_update(ctx: &mut AppContext) -> Option<ModeId> {
    let was_over = ctx.memory.is_over();
    match ctx.memory.update(ctx.now) {
        Some(Symbol::Dot) => ctx.cue(AudioCue::Dot),
        Some(Symbol::Dash) => ctx.cue(AudioCue::Dash),
        None => {}
    }
    if !was_over && ctx.memory.is_over() {
        ctx.cue(AudioCue::Error);
    }
    // GameOver waits for a press before showing the result.
    None
}

fn memory_down(ctx: &mut AppContext) {
    ctx.memory.press_started(ctx.now);
}

fn memory_press(ctx: &mut AppContext, press: Press) -> Option<ModeId> {
    if ctx.memory.is_over() {
        let summary = GameSummary::memory(ctx.memory.level());
        return end_game(ctx, summary);
    }
    let now = ctx.now;
    match ctx.memory.press_released(press.held_ms, now, &mut ctx.rng) {
        InputOutcome::Correct | InputOutcome::RoundComplete => ctx.cue(AudioCue::Beep),
        InputOutcome::Wrong => ctx.cue(AudioCue::Error),
        InputOutcome::Ignored => {}
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  TIC-TAC-TOE
// ═══════════════════════════════════════════════════════════════════════════

fn tictactoe_enter(ctx: &mut AppContext) {
    ctx.active_game = GameKind::TicTacToe;
    let now = ctx.now;
    ctx.tictactoe.reset(now, &mut ctx.rng);
}

fn tictactoe_update(ctx: &mut AppContext) -> Option<ModeId> {
    let now = ctx.now;
    if ctx.tictactoe.update(now, &mut ctx.rng) {
        ctx.cue(AudioCue::Beep);
    }
    if ctx.tictactoe.is_over() {
        let summary = GameSummary::tictactoe(ctx.tictactoe.result());
        return end_game(ctx, summary);
    }
    None
}

fn tictactoe_press(ctx: &mut AppContext, press: Press) -> Option<ModeId> {
    if !press.is_long() {
        ctx.tictactoe.move_cursor();
        return None;
    }
    if !ctx.tictactoe.try_place_piece(ctx.now) {
        ctx.cue(AudioCue::Error);
        return None;
    }
    if ctx.tictactoe.is_over() {
        let summary = GameSummary::tictactoe(ctx.tictactoe.result());
        return end_game(ctx, summary);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  GAME RESULT
// ═══════════════════════════════════════════════════════════════════════════

fn game_result_enter(ctx: &mut AppContext) {
    let Some(summary) = ctx.last_game else {
        return;
    };
    ctx.pet.add_coins(summary.coins);
    ctx.pet.add_boredom(summary.coins);
    ctx.event(AppEvent::GameFinished(summary));
}

fn game_result_exit(ctx: &mut AppContext) {
    ctx.pet.cheer(ctx.now);
}

fn game_result_update(ctx: &mut AppContext) -> Option<ModeId> {
    let held = ctx.now.saturating_sub(ctx.mode_entered_at);
    (held >= u64::from(ctx.config.game_result_hold_ms)).then_some(ModeId::MainView)
}

// ═══════════════════════════════════════════════════════════════════════════
//  SLEEPING
// ═══════════════════════════════════════════════════════════════════════════

fn sleeping_update(ctx: &mut AppContext) -> Option<ModeId> {
    (!ctx.pet.is_sleeping()).then_some(ModeId::MainView)
}

fn sleeping_press(ctx: &mut AppContext, _press: Press) -> Option<ModeId> {
    ctx.pet.wake_up(ctx.now);
    ctx.cue(AudioCue::Beep);
    Some(ModeId::MainView)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PetConfig;
    use crate::fsm::Fsm;

    fn setup() -> (Fsm, AppContext) {
        let mut fsm = Fsm::new(build_mode_table(), ModeId::MainView);
        let mut ctx = AppContext::new(PetConfig::default(), 7);
        fsm.start(&mut ctx);
        (fsm, ctx)
    }

    fn long(button: ButtonId) -> Press {
        Press::new(button, 700, 500)
    }

    #[test]
    fn step_wraps_both_ways() {
        assert_eq!(step(0, 4, Nav::Prev), 3);
        assert_eq!(step(3, 4, Nav::Next), 0);
        assert_eq!(step(5, 4, Nav::Commit), 3);
        assert_eq!(step(0, 0, Nav::Next), 0);
    }

    #[test]
    fn entering_a_game_costs_energy() {
        let (mut fsm, mut ctx) = setup();
        fsm.force_transition(ModeId::GameMenu, &mut ctx);
        fsm.press(long(ButtonId::Action), &mut ctx);
        assert_eq!(fsm.current_mode(), ModeId::Dodge);
        assert_eq!(ctx.pet.hunger(), 85);
        assert_eq!(ctx.pet.sleepiness(), 85);
    }

    #[test]
    fn dodge_quit_pays_out_through_result() {
        let (mut fsm, mut ctx) = setup();
        fsm.force_transition(ModeId::Dodge, &mut ctx);
        fsm.press(long(ButtonId::Action), &mut ctx);
        assert_eq!(fsm.current_mode(), ModeId::GameResult);
        assert_eq!(ctx.pet.coins(), 1);
        assert_eq!(ctx.pending_finish, Some(GameKind::Dodge));

        ctx.now = 2_999;
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_mode(), ModeId::GameResult);
        ctx.now = 3_000;
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_mode(), ModeId::MainView);
        assert!(ctx.pet.is_happy(3_000));
    }

    #[test]
    fn failed_purchase_keeps_shop_open() {
        let (mut fsm, mut ctx) = setup();
        fsm.force_transition(ModeId::ShopMenu, &mut ctx);
        fsm.press(long(ButtonId::Action), &mut ctx);
        assert_eq!(fsm.current_mode(), ModeId::ShopMenu);
        assert!(ctx.pet.is_short_of_coins(0));
        assert!(
            ctx.outbox
                .events
                .iter()
                .any(|e| matches!(e, AppEvent::PurchaseRejected(_)))
        );
    }

    #[test]
    fn successful_purchase_closes_shop() {
        let (mut fsm, mut ctx) = setup();
        ctx.pet.add_coins(10);
        fsm.force_transition(ModeId::ShopMenu, &mut ctx);
        fsm.press(long(ButtonId::Action), &mut ctx);
        assert_eq!(fsm.current_mode(), ModeId::MainView);
        assert_eq!(ctx.pet.coins(), 0);
    }

    #[test]
    fn memory_game_over_waits_for_a_press() {
        let (mut fsm, mut ctx) = setup();
        fsm.force_transition(ModeId::Memory, &mut ctx);
        // Let the single-symbol show finish, then idle past the timeout.
        ctx.now = 1_000;
        fsm.tick(&mut ctx);
        ctx.now = 5_000;
        fsm.tick(&mut ctx);
        assert!(ctx.memory.is_over());
        assert_eq!(fsm.current_mode(), ModeId::Memory);

        fsm.press(Press::new(ButtonId::Left, 50, 500), &mut ctx);
        assert_eq!(fsm.current_mode(), ModeId::GameResult);
        assert_eq!(ctx.pet.coins(), 0);
    }
}
