// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use crate::common::{Result, require};
use crate::entity::Init;
use crate::frame::{Frame, Shaft};
use crate::lamination::{AnyLamination, LamHole, LamSlotMag, LamSlotWind, Lamination};
use crate::{constraint_err, declare_entity, declare_family};

fn default_rotor() -> AnyLamination {
    AnyLamination::from(Lamination {
        is_stator: Some(false),
        ..Default::default()
    })
}

fn default_stator() -> AnyLamination {
    AnyLamination::from(Lamination {
        is_internal: Some(false),
        ..Default::default()
    })
}

fn wound_stator() -> AnyLamination {
    let mut stator = LamSlotWind::default();
    stator.is_internal = Some(false);
    AnyLamination::from(stator)
}

declare_entity! {
    /// An electrical machine: two laminations facing each other across the
    /// airgap, in a frame, on a shaft.
    pub struct Machine {
        rotor ("rotor"): AnyLamination = default_rotor(),
        stator ("stator"): AnyLamination = default_stator(),
        frame ("frame"): Frame = Frame::default(),
        shaft ("shaft"): Shaft = Shaft::default(),
        name ("name"): Option<String> = Some("default_machine".to_owned()),
        desc ("desc"): Option<String> = Some(String::new()),
    }
}

declare_entity! {
    /// Synchronous machines.
    pub struct MachineSync: Machine {}
}

declare_entity! {
    /// Asynchronous (induction) machines.
    pub struct MachineAsync: Machine {}
}

declare_entity! {
    /// Surface permanent magnet synchronous machine.
    pub struct MachineSIPMSM: MachineSync (MachineSync {
        parent: Machine {
            rotor: AnyLamination::from(LamSlotMag::default()),
            stator: wound_stator(),
            ..Default::default()
        },
    }) {}
}

declare_entity! {
    /// Interior permanent magnet synchronous machine.
    pub struct MachineIPMSM: MachineSync (MachineSync {
        parent: Machine {
            rotor: AnyLamination::from(LamHole::default()),
            stator: wound_stator(),
            ..Default::default()
        },
    }) {}
}

declare_family! {
    /// Any machine class.
    pub enum AnyMachine(Machine) {
        Machine,
        MachineSync,
        MachineAsync,
        MachineSIPMSM,
        MachineIPMSM,
    }
}

impl Machine {
    /// Override the nested parts of a freshly built machine.
    pub fn set_parts(
        &mut self,
        rotor: Init<AnyLamination>,
        stator: Init<AnyLamination>,
        frame: Init<Frame>,
        shaft: Init<Shaft>,
    ) {
        rotor.apply(&mut self.rotor);
        stator.apply(&mut self.stator);
        frame.apply(&mut self.frame);
        shaft.apply(&mut self.shaft);
    }

    /// Mechanical airgap width [m], between the two bore radii.
    pub fn comp_width_airgap_mec(&self) -> Result<f64> {
        let rotor = self.rotor.as_lamination();
        let stator = self.stator.as_lamination();
        if self.rotor.is_internal() {
            Ok(require(stator.rint, "stator.Rint")? - require(rotor.rext, "rotor.Rext")?)
        } else {
            Ok(require(rotor.rint, "rotor.Rint")? - require(stator.rext, "stator.Rext")?)
        }
    }
}

macro_rules! impl_machine_new {
    ($($name:ident),+) => {
        $(
            impl $name {
                /// Build with the class defaults, then apply each part.
                pub fn new(
                    rotor: Init<AnyLamination>,
                    stator: Init<AnyLamination>,
                    frame: Init<Frame>,
                    shaft: Init<Shaft>,
                ) -> Self {
                    let mut machine = Self::default();
                    machine.set_parts(rotor, stator, frame, shaft);
                    machine
                }
            }
        )+
    };
}

impl_machine_new!(Machine, MachineSync, MachineAsync, MachineSIPMSM, MachineIPMSM);

impl MachineSync {
    /// Angle [rad] to apply to the rotor so its d-axis lines up with the
    /// stator's.
    pub fn comp_initial_angle(&self) -> Result<f64> {
        Ok(self.stator.comp_angle_d_axis()? - self.rotor.comp_angle_d_axis()?)
    }
}

impl AnyMachine {
    pub fn as_machine(&self) -> &Machine {
        match self {
            AnyMachine::Machine(m) => m,
            AnyMachine::MachineSync(m) => &m.parent,
            AnyMachine::MachineAsync(m) => &m.parent,
            AnyMachine::MachineSIPMSM(m) => &m.parent.parent,
            AnyMachine::MachineIPMSM(m) => &m.parent.parent,
        }
    }

    pub fn as_machine_mut(&mut self) -> &mut Machine {
        match self {
            AnyMachine::Machine(m) => m,
            AnyMachine::MachineSync(m) => &mut m.parent,
            AnyMachine::MachineAsync(m) => &mut m.parent,
            AnyMachine::MachineSIPMSM(m) => &mut m.parent.parent,
            AnyMachine::MachineIPMSM(m) => &mut m.parent.parent,
        }
    }

    pub fn is_synchronous(&self) -> bool {
        matches!(
            self,
            AnyMachine::MachineSync(_) | AnyMachine::MachineSIPMSM(_) | AnyMachine::MachineIPMSM(_)
        )
    }

    pub fn comp_width_airgap_mec(&self) -> Result<f64> {
        self.as_machine().comp_width_airgap_mec()
    }

    pub fn comp_initial_angle(&self) -> Result<f64> {
        match self {
            AnyMachine::MachineSync(m) => m.comp_initial_angle(),
            AnyMachine::MachineSIPMSM(m) => m.comp_initial_angle(),
            AnyMachine::MachineIPMSM(m) => m.comp_initial_angle(),
            AnyMachine::Machine(_) | AnyMachine::MachineAsync(_) => constraint_err!(
                NotImplemented,
                format!("{} is not synchronous", self.class_name())
            ),
        }
    }
}
