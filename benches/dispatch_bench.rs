//! Dispatch throughput: queue a batch of delayed telegrams, then drain them

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use behavior_engine::core::types::EntityId;
use behavior_engine::entity::{Agent, EntityCore};
use behavior_engine::fsm::{State, StateMachine, StateOwner};
use behavior_engine::messaging::Telegram;
use behavior_engine::{Result, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Msg {
    Tick,
}

struct Node {
    core: EntityCore,
    fsm: StateMachine<Node>,
    received: u64,
}

impl StateOwner for Node {
    type Message = Msg;

    fn state_machine(&self) -> &StateMachine<Self> {
        &self.fsm
    }

    fn state_machine_mut(&mut self) -> &mut StateMachine<Self> {
        &mut self.fsm
    }
}

impl Agent for Node {
    fn core(&self) -> &EntityCore {
        &self.core
    }
}

struct Counting;

impl State<Node> for Counting {
    fn name(&self) -> &'static str {
        "Counting"
    }

    fn on_message(&self, _telegram: &Telegram<Msg>, owner: &mut Node, _world: &mut World<Msg>) -> Result<bool> {
        owner.received += 1;
        Ok(true)
    }
}

const NODES: u32 = 64;
const TELEGRAMS: u32 = 10_000;

fn setup() -> World<Msg> {
    let mut world = World::new();
    let counting = world.states_mut().register::<Node, _>(Counting);
    for _ in 0..NODES {
        let id = world.allocate_id().unwrap();
        world
            .add_entity(Node {
                core: EntityCore::new(id, format!("node-{}", id.raw())),
                fsm: StateMachine::new(counting.clone()),
                received: 0,
            })
            .unwrap();
    }
    for i in 0..TELEGRAMS {
        let sender = EntityId(i % NODES);
        let receiver = EntityId((i * 7) % NODES);
        let delay = 1.0 + (i % 13) as f64;
        world.send(sender, receiver, Msg::Tick, delay, None).unwrap();
    }
    world
}

fn bench_drain(c: &mut Criterion) {
    c.bench_function("drain 10k delayed telegrams", |b| {
        b.iter_batched(
            setup,
            |mut world| black_box(world.drain_due(20.0).unwrap().delivered),
            BatchSize::LargeInput,
        )
    });
}

fn bench_immediate(c: &mut Criterion) {
    let mut world = setup();
    c.bench_function("immediate send", |b| {
        b.iter(|| {
            black_box(
                world
                    .send(EntityId(0), EntityId(1), Msg::Tick, 0.0, None)
                    .unwrap(),
            )
        })
    });
}

criterion_group!(benches, bench_drain, bench_immediate);
criterion_main!(benches);
