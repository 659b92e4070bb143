//! Miner Bob: digs for gold, banks it, drinks, sleeps, and eats his wife's stew

use std::cell::RefCell;
use std::rc::Rc;

use behavior_engine::entity::{Agent, EntityCore};
use behavior_engine::fsm::{State, StateCatalog, StateMachine, StateOwner};
use behavior_engine::messaging::Telegram;
use behavior_engine::{EngineError, Result, World};

use crate::{Location, Message, WIFE_NAME};

/// Gold nuggets that fit in Bob's pockets
const POCKET_CAPACITY: u32 = 3;
/// Banked gold at which Bob feels rich enough to go home
const COMFORT_LEVEL: u32 = 5;
const THIRST_LIMIT: u32 = 5;
const TIREDNESS_LIMIT: u32 = 5;

pub struct Miner {
    core: EntityCore,
    fsm: StateMachine<Miner>,
    pub location: Location,
    pub gold_carried: u32,
    pub money_in_bank: u32,
    pub thirst: u32,
    pub fatigue: u32,
    pub stews_eaten: u32,
}

impl Miner {
    fn pockets_full(&self) -> bool {
        self.gold_carried >= POCKET_CAPACITY
    }

    fn thirsty(&self) -> bool {
        self.thirst >= THIRST_LIMIT
    }

    fn fatigued(&self) -> bool {
        self.fatigue >= TIREDNESS_LIMIT
    }

    fn say(&self, line: &str) {
        println!("{}: {}", self.core.name(), line);
    }
}

impl StateOwner for Miner {
    type Message = Message;

    fn state_machine(&self) -> &StateMachine<Self> {
        &self.fsm
    }

    fn state_machine_mut(&mut self) -> &mut StateMachine<Self> {
        &mut self.fsm
    }
}

impl Agent for Miner {
    fn core(&self) -> &EntityCore {
        &self.core
    }
}

pub fn register_states(catalog: &mut StateCatalog) {
    catalog.register::<Miner, _>(DigForNugget);
    catalog.register::<Miner, _>(DepositGold);
    catalog.register::<Miner, _>(SleepTilRested);
    catalog.register::<Miner, _>(QuenchThirst);
    catalog.register::<Miner, _>(EatStew);
}

pub fn spawn(world: &mut World<Message>, name: &str) -> Result<Rc<RefCell<Miner>>> {
    let id = world.allocate_id()?;
    let initial = world.state::<Miner, DigForNugget>()?;
    let miner = world.add_entity(Miner {
        core: EntityCore::new(id, name),
        fsm: StateMachine::new(initial),
        location: Location::Shack,
        gold_carried: 0,
        money_in_bank: 0,
        thirst: 0,
        fatigue: 0,
        stews_eaten: 0,
    })?;
    StateMachine::enter_initial(&mut *miner.borrow_mut(), world)?;
    Ok(miner)
}

fn go_to<S: State<Miner>>(owner: &mut Miner, world: &mut World<Message>) -> Result<bool> {
    let next = world.state::<Miner, S>()?;
    owner.change_state(next, world)
}

pub struct DigForNugget;

impl State<Miner> for DigForNugget {
    fn name(&self) -> &'static str {
        "DigForNugget"
    }

    fn enter(&self, owner: &mut Miner, _world: &mut World<Message>) -> Result<()> {
        if owner.location != Location::Goldmine {
            owner.say("Walkin' to the goldmine");
            owner.location = Location::Goldmine;
        }
        Ok(())
    }

    fn execute(&self, owner: &mut Miner, world: &mut World<Message>) -> Result<()> {
        owner.gold_carried += 1;
        owner.fatigue += 1;
        owner.thirst += 1;
        owner.say("Pickin' up a nugget");

        if owner.pockets_full() {
            go_to::<DepositGold>(owner, world)?;
        } else if owner.thirsty() {
            go_to::<QuenchThirst>(owner, world)?;
        }
        Ok(())
    }

    fn exit(&self, owner: &mut Miner, _world: &mut World<Message>) -> Result<()> {
        owner.say("Ah'm leavin' the goldmine with mah pockets full o' sweet gold");
        Ok(())
    }
}

pub struct DepositGold;

impl State<Miner> for DepositGold {
    fn name(&self) -> &'static str {
        "DepositGold"
    }

    fn enter(&self, owner: &mut Miner, _world: &mut World<Message>) -> Result<()> {
        if owner.location != Location::Bank {
            owner.say("Goin' to the bank. Yes siree");
            owner.location = Location::Bank;
        }
        Ok(())
    }

    fn execute(&self, owner: &mut Miner, world: &mut World<Message>) -> Result<()> {
        owner.money_in_bank += owner.gold_carried;
        owner.gold_carried = 0;
        owner.say(&format!("Depositing gold. Total savings now: {}", owner.money_in_bank));

        if owner.money_in_bank >= COMFORT_LEVEL || owner.fatigued() {
            owner.say("WooHoo! Rich enough for now. Back home to mah li'lle lady");
            go_to::<SleepTilRested>(owner, world)?;
        } else {
            go_to::<DigForNugget>(owner, world)?;
        }
        Ok(())
    }

    fn exit(&self, owner: &mut Miner, _world: &mut World<Message>) -> Result<()> {
        owner.say("Leavin' the bank");
        Ok(())
    }
}

pub struct SleepTilRested;

impl State<Miner> for SleepTilRested {
    fn name(&self) -> &'static str {
        "SleepTilRested"
    }

    fn enter(&self, owner: &mut Miner, world: &mut World<Message>) -> Result<()> {
        if owner.location != Location::Shack {
            owner.say("Walkin' home");
            owner.location = Location::Shack;
            world.send_by_name(
                owner.core.name(),
                &WIFE_NAME.into(),
                Message::HiHoneyImHome,
                0.0,
                None,
            )?;
        }
        Ok(())
    }

    fn execute(&self, owner: &mut Miner, world: &mut World<Message>) -> Result<()> {
        if owner.fatigue == 0 {
            owner.say("What a God darn fantastic nap! Time to find more gold");
            go_to::<DigForNugget>(owner, world)?;
        } else {
            owner.fatigue -= 1;
            owner.say("ZZZZ... ");
        }
        Ok(())
    }

    fn exit(&self, owner: &mut Miner, _world: &mut World<Message>) -> Result<()> {
        owner.say("Leaving the house");
        Ok(())
    }

    fn on_message(
        &self,
        telegram: &Telegram<Message>,
        owner: &mut Miner,
        world: &mut World<Message>,
    ) -> Result<bool> {
        if telegram.kind() != Message::StewReady {
            return Ok(false);
        }
        owner.say("Okay Hun, ahm a comin'!");
        go_to::<EatStew>(owner, world)?;
        Ok(true)
    }
}

pub struct QuenchThirst;

impl State<Miner> for QuenchThirst {
    fn name(&self) -> &'static str {
        "QuenchThirst"
    }

    fn enter(&self, owner: &mut Miner, _world: &mut World<Message>) -> Result<()> {
        if owner.location != Location::Saloon {
            owner.location = Location::Saloon;
            owner.say("Boy, ah sure is thusty! Walking to the saloon");
        }
        Ok(())
    }

    fn execute(&self, owner: &mut Miner, world: &mut World<Message>) -> Result<()> {
        if owner.location != Location::Saloon {
            return Err(EngineError::precondition(
                owner.core.id(),
                "can only drink at the saloon",
            ));
        }
        owner.thirst = 0;
        owner.say("That's mighty fine sippin' liquer");
        go_to::<DigForNugget>(owner, world)?;
        Ok(())
    }

    fn exit(&self, owner: &mut Miner, _world: &mut World<Message>) -> Result<()> {
        owner.say("Leaving the saloon, feelin' good");
        Ok(())
    }
}

pub struct EatStew;

impl State<Miner> for EatStew {
    fn name(&self) -> &'static str {
        "EatStew"
    }

    fn enter(&self, owner: &mut Miner, _world: &mut World<Message>) -> Result<()> {
        owner.say("Smells Reaaal goood Elsa!");
        Ok(())
    }

    fn execute(&self, owner: &mut Miner, world: &mut World<Message>) -> Result<()> {
        owner.stews_eaten += 1;
        owner.say("Tastes real good too!");
        owner.revert_to_previous_state(world)?;
        Ok(())
    }

    fn exit(&self, owner: &mut Miner, _world: &mut World<Message>) -> Result<()> {
        owner.say("Thankya li'lle lady. Ah better get back to whatever ah wuz doin'");
        Ok(())
    }
}
