use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::log::LogPlugin;
use bevy::prelude::*;

use boss_brain::combat::{
    BossAgent, BossBody, BossDamageMessage, BossDefeatedEvent, BossEvent, BossEventMessage,
    CombatPlugin, TargetBody,
};
use boss_brain::content::{BossRegistry, ContentPlugin};
#[cfg(feature = "dev-tools")]
use boss_brain::debug::{DebugAction, DebugCommand, DebugPlugin};

/// Hard stop for the scripted fight, in seconds.
const FIGHT_TIME_LIMIT: f32 = 180.0;

/// Scripted stand-in for a player: circles the boss and lands a hit every `hit_interval`.
#[derive(Resource, Debug)]
struct FightScript {
    boss: Entity,
    target: Entity,
    elapsed: f32,
    next_hit: f32,
    hit_interval: f32,
    hit_damage: f32,
    #[cfg(feature = "dev-tools")]
    next_snapshot: f32,
}

fn main() {
    let mut app = App::new();
    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / 60.0,
        ))),
    )
    .add_plugins(LogPlugin::default())
    .add_plugins((ContentPlugin::default(), CombatPlugin))
    .add_systems(Startup, setup_fight)
    .add_systems(Update, (script_target, log_boss_events, finish_fight));

    #[cfg(feature = "dev-tools")]
    app.add_plugins(DebugPlugin)
        .add_systems(Update, request_snapshots);

    app.run();
}

fn setup_fight(mut commands: Commands, registry: Res<BossRegistry>) {
    let def = registry.first().cloned().unwrap_or_default();
    info!("Spawning boss '{}' ({} hp)", def.name, def.max_health);

    let target = commands
        .spawn(TargetBody::new(Vec2::new(10.0, 0.0), 400.0))
        .id();
    let boss = commands
        .spawn((BossAgent::new(def, Some(target)), BossBody::new(Vec2::ZERO)))
        .id();

    commands.insert_resource(FightScript {
        boss,
        target,
        elapsed: 0.0,
        next_hit: 1.0,
        hit_interval: 0.7,
        hit_damage: 35.0,
        #[cfg(feature = "dev-tools")]
        next_snapshot: 5.0,
    });
}

fn script_target(
    time: Res<Time>,
    mut script: ResMut<FightScript>,
    mut target_query: Query<&mut TargetBody>,
    boss_query: Query<&BossBody>,
    mut damage: MessageWriter<BossDamageMessage>,
) {
    script.elapsed += time.delta_secs();
    let t = script.elapsed;

    let Ok(mut target) = target_query.get_mut(script.target) else {
        return;
    };
    let center = boss_query
        .get(script.boss)
        .map_or(Vec2::ZERO, |body| body.position);
    let radius = 5.0 + 3.0 * (t * 0.3).sin();
    target.position = center + Vec2::from_angle(t * 0.4) * radius;

    if target.is_alive() && t >= script.next_hit {
        script.next_hit = t + script.hit_interval;
        damage.write(BossDamageMessage {
            boss: script.boss,
            amount: script.hit_damage,
        });
    }
}

fn log_boss_events(mut events: MessageReader<BossEventMessage>) {
    for message in events.read() {
        match &message.event {
            BossEvent::DamageTaken { .. } => {}
            event => info!("{:?}: {:?}", message.boss, event),
        }
    }
}

fn finish_fight(
    script: Res<FightScript>,
    mut defeated: MessageReader<BossDefeatedEvent>,
    boss_query: Query<&BossAgent>,
    target_query: Query<&TargetBody>,
    mut exit: MessageWriter<AppExit>,
) {
    for event in defeated.read() {
        info!("Boss {:?} defeated after {:.1}s", event.boss, script.elapsed);
    }

    let boss_gone = boss_query.get(script.boss).is_err();
    let target_down = target_query
        .get(script.target)
        .is_ok_and(|target| !target.is_alive());
    if boss_gone || target_down || script.elapsed > FIGHT_TIME_LIMIT {
        info!(
            "Fight over: boss gone {}, target down {}, {:.1}s",
            boss_gone, target_down, script.elapsed
        );
        exit.write(AppExit::Success);
    }
}

#[cfg(feature = "dev-tools")]
fn request_snapshots(mut script: ResMut<FightScript>, mut debug: MessageWriter<DebugCommand>) {
    if script.elapsed >= script.next_snapshot {
        script.next_snapshot += 5.0;
        debug.write(DebugCommand {
            boss: Some(script.boss),
            action: DebugAction::Snapshot,
        });
    }
}
