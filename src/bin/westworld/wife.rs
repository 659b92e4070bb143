//! Elsa: keeps house, cooks for Bob when he gets home

use std::cell::RefCell;
use std::rc::Rc;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use behavior_engine::entity::{Agent, EntityCore};
use behavior_engine::fsm::{State, StateCatalog, StateMachine, StateOwner};
use behavior_engine::messaging::Telegram;
use behavior_engine::{Result, World};

use crate::{Location, Message, MINER_NAME};

/// Chance per tick of a trip to the bathroom
const BATHROOM_CHANCE: f64 = 0.1;
/// Seconds the stew spends on the stove
const STEW_COOK_TIME: f64 = 1.5;

pub struct Wife {
    core: EntityCore,
    fsm: StateMachine<Wife>,
    rng: ChaCha8Rng,
    pub location: Location,
    pub cooking: bool,
    pub chores_done: u32,
    pub stews_served: u32,
}

impl Wife {
    fn say(&self, line: &str) {
        println!("{}: {}", self.core.name(), line);
    }
}

impl StateOwner for Wife {
    type Message = Message;

    fn state_machine(&self) -> &StateMachine<Self> {
        &self.fsm
    }

    fn state_machine_mut(&mut self) -> &mut StateMachine<Self> {
        &mut self.fsm
    }
}

impl Agent for Wife {
    fn core(&self) -> &EntityCore {
        &self.core
    }
}

pub fn register_states(catalog: &mut StateCatalog) {
    catalog.register::<Wife, _>(WifeGlobal);
    catalog.register::<Wife, _>(DoHouseWork);
    catalog.register::<Wife, _>(VisitBathroom);
    catalog.register::<Wife, _>(CookStew);
}

pub fn spawn(world: &mut World<Message>, name: &str, seed: u64) -> Result<Rc<RefCell<Wife>>> {
    let id = world.allocate_id()?;
    let fsm = StateMachine::new(world.state::<Wife, DoHouseWork>()?)
        .with_global(world.state::<Wife, WifeGlobal>()?);
    let wife = world.add_entity(Wife {
        core: EntityCore::new(id, name),
        fsm,
        rng: ChaCha8Rng::seed_from_u64(seed),
        location: Location::Shack,
        cooking: false,
        chores_done: 0,
        stews_served: 0,
    })?;
    StateMachine::enter_initial(&mut *wife.borrow_mut(), world)?;
    Ok(wife)
}

fn go_to<S: State<Wife>>(owner: &mut Wife, world: &mut World<Message>) -> Result<bool> {
    let next = world.state::<Wife, S>()?;
    owner.change_state(next, world)
}

/// Runs every tick whatever Elsa is doing
pub struct WifeGlobal;

impl State<Wife> for WifeGlobal {
    fn name(&self) -> &'static str {
        "WifeGlobal"
    }

    fn execute(&self, owner: &mut Wife, world: &mut World<Message>) -> Result<()> {
        let bathroom = world.state::<Wife, VisitBathroom>()?;
        if !owner.cooking && !owner.is_in_state(&bathroom) && owner.rng.gen_bool(BATHROOM_CHANCE) {
            owner.change_state(bathroom, world)?;
        }
        Ok(())
    }

    fn on_message(
        &self,
        telegram: &Telegram<Message>,
        owner: &mut Wife,
        world: &mut World<Message>,
    ) -> Result<bool> {
        if telegram.kind() != Message::HiHoneyImHome {
            return Ok(false);
        }
        owner.say("Hi honey. Let me make you some of mah fine country stew");
        go_to::<CookStew>(owner, world)?;
        Ok(true)
    }
}

pub struct DoHouseWork;

impl State<Wife> for DoHouseWork {
    fn name(&self) -> &'static str {
        "DoHouseWork"
    }

    fn enter(&self, owner: &mut Wife, _world: &mut World<Message>) -> Result<()> {
        owner.location = Location::Shack;
        owner.say("Time to do some more housework!");
        Ok(())
    }

    fn execute(&self, owner: &mut Wife, _world: &mut World<Message>) -> Result<()> {
        let chore = match owner.rng.gen_range(0..3) {
            0 => "Moppin' the floor",
            1 => "Washin' the dishes",
            _ => "Makin' the bed",
        };
        owner.chores_done += 1;
        owner.say(chore);
        Ok(())
    }
}

pub struct VisitBathroom;

impl State<Wife> for VisitBathroom {
    fn name(&self) -> &'static str {
        "VisitBathroom"
    }

    fn enter(&self, owner: &mut Wife, _world: &mut World<Message>) -> Result<()> {
        owner.say("Walkin' to the can. Need to powda mah pretty li'lle nose");
        Ok(())
    }

    fn execute(&self, owner: &mut Wife, world: &mut World<Message>) -> Result<()> {
        owner.say("Ahhhhhh! Sweet relief!");
        owner.revert_to_previous_state(world)?;
        Ok(())
    }

    fn exit(&self, owner: &mut Wife, _world: &mut World<Message>) -> Result<()> {
        owner.say("Leavin' the Jon");
        Ok(())
    }
}

pub struct CookStew;

impl State<Wife> for CookStew {
    fn name(&self) -> &'static str {
        "CookStew"
    }

    fn enter(&self, owner: &mut Wife, world: &mut World<Message>) -> Result<()> {
        if !owner.cooking {
            owner.say("Putting the stew in the oven");
            let me = owner.core.id();
            world.send(me, me, Message::StewReady, STEW_COOK_TIME, None)?;
            owner.cooking = true;
        }
        Ok(())
    }

    fn execute(&self, owner: &mut Wife, _world: &mut World<Message>) -> Result<()> {
        owner.say("Fussin' over food");
        Ok(())
    }

    fn exit(&self, owner: &mut Wife, _world: &mut World<Message>) -> Result<()> {
        owner.say("Puttin' the stew on the table");
        Ok(())
    }

    fn on_message(
        &self,
        telegram: &Telegram<Message>,
        owner: &mut Wife,
        world: &mut World<Message>,
    ) -> Result<bool> {
        if telegram.kind() != Message::StewReady {
            return Ok(false);
        }
        owner.say("StewReady! Lets eat");

        let miner = world
            .registry()
            .id_of(&MINER_NAME.into())
            .ok_or_else(|| behavior_engine::EngineError::UnknownName(MINER_NAME.into()))?;
        world.send(owner.core.id(), miner, Message::StewReady, 0.0, None)?;

        owner.cooking = false;
        owner.stews_served += 1;
        go_to::<DoHouseWork>(owner, world)?;
        Ok(true)
    }
}
