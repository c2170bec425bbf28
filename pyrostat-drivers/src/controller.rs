//! Control-loop orchestrator
//!
//! `PitController` owns every subsystem exclusively and runs them in
//! dependency order on each tick: sample probes, regulate, map the output
//! onto the actuators, evaluate alarms and errors, feed the predictor,
//! record the session. No subsystem holds a reference to another; shared
//! reads go through the per-tick values the orchestrator passes along.
//!
//! External collaborators submit [`Command`]s; they are queued and applied
//! at the top of the next tick, so a command never observes a half-updated
//! tick.

use heapless::Vec;

use pyrostat_core::alarm::{AlarmKind, AlarmMonitor};
use pyrostat_core::config::ControllerConfig;
use pyrostat_core::control::{split_range, PitPid};
use pyrostat_core::error::ErrorMonitor;
use pyrostat_core::predict::Predictor;
use pyrostat_core::probe::{ProbeId, ProbeReading};
use pyrostat_core::session::CookSession;
use pyrostat_core::traits::{AdcReader, Buzzer, Clock, PwmOutput, ServoOutput, SessionStore};
use pyrostat_protocol::record::{flags, temp_to_x10, DataPoint};
use pyrostat_protocol::{Command, StateSnapshot};

use crate::buzzer::BuzzerDriver;
use crate::damper::DamperActuator;
use crate::fan::FanActuator;
use crate::probe::ProbeSampler;

/// Pending commands held between ticks
pub const MAX_PENDING_COMMANDS: usize = 8;

/// Errors from command submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// The pending queue is full; resubmit after the next tick
    QueueFull,
}

/// The pit controller
///
/// Generic over the capability traits so the whole loop runs against real
/// hardware or against fakes in tests. `K` is the session ring capacity.
pub struct PitController<C, A, P, V, B, S, const K: usize> {
    clock: C,
    store: S,
    config: ControllerConfig,
    sampler: ProbeSampler<A>,
    pid: PitPid,
    fan: FanActuator<P>,
    damper: DamperActuator<V>,
    buzzer: BuzzerDriver<B>,
    alarm: AlarmMonitor,
    errors: ErrorMonitor,
    predictor: Predictor,
    session: CookSession<K>,
    pending: Vec<Command, MAX_PENDING_COMMANDS>,
    /// Pit has touched the setpoint since it was last changed; arms the
    /// deviation alarm
    pit_reached: bool,
}

impl<C, A, P, V, B, S, const K: usize> PitController<C, A, P, V, B, S, K>
where
    C: Clock,
    A: AdcReader,
    P: PwmOutput,
    V: ServoOutput,
    B: Buzzer,
    S: SessionStore,
{
    /// Wire up a controller from its capabilities and configuration
    pub fn new(
        clock: C,
        adcs: [A; 3],
        fan_pwm: P,
        damper_servo: V,
        buzzer_out: B,
        store: S,
        config: ControllerConfig,
    ) -> Self {
        let sampler = ProbeSampler::new(adcs, &config.probes, config.sampler.clone(), config.unit);
        let pid = PitPid::new(config.pid.clone());
        let fan = FanActuator::new(fan_pwm, config.fan.clone());
        let damper = DamperActuator::new(damper_servo, config.damper.clone());
        let buzzer = BuzzerDriver::new(buzzer_out, config.alarm.buzzer_freq_hz);
        let alarm = AlarmMonitor::new(config.alarm.clone());
        let names = [
            config.probes[0].name.clone(),
            config.probes[1].name.clone(),
            config.probes[2].name.clone(),
        ];
        let errors = ErrorMonitor::new(names, config.fire_out.clone());
        let session = CookSession::new(config.session.clone());

        Self {
            clock,
            store,
            config,
            sampler,
            pid,
            fan,
            damper,
            buzzer,
            alarm,
            errors,
            predictor: Predictor::new(),
            session,
            pending: Vec::new(),
            pit_reached: false,
        }
    }

    /// Recover a prior cook session from storage; call once at boot
    ///
    /// Returns true when a session was resumed.
    pub fn begin(&mut self) -> bool {
        self.session.begin(&mut self.store)
    }

    /// Queue a command for the next tick
    pub fn submit(&mut self, command: Command) -> Result<(), CommandError> {
        self.pending
            .push(command)
            .map_err(|_| CommandError::QueueFull)
    }

    /// Run one tick of the control loop
    pub fn tick(&mut self) {
        let now_ms = self.clock.now_ms();
        let epoch = self.clock.epoch_seconds();

        let pending = core::mem::take(&mut self.pending);
        for command in &pending {
            self.apply(*command, epoch);
        }

        // 1. Probes
        self.sampler.update(now_ms);
        let readings = self.sampler.readings();
        let pit = readings[0].valid();
        let meats = [readings[1].valid(), readings[2].valid()];

        // 2. Regulator; an invalid pit probe degrades to idle drive without
        // disturbing the regulator's state
        let setpoint = self.pid.setpoint();
        if let Some(p) = pit {
            if setpoint > 0.0 && p >= setpoint {
                self.pit_reached = true;
            }
        }
        let output = match pit {
            Some(p) => self.pid.update(now_ms, p),
            None => 0.0,
        };

        // 3. Actuators
        let (damper_pct, fan_pct) = split_range(output, self.config.fan.on_threshold);
        self.fan.set_speed(round_percent(fan_pct));
        self.fan.update(now_ms);
        self.damper.set_position(round_percent(damper_pct));

        // 4. Alarms and buzzer
        self.alarm
            .update(now_ms, pit, meats, setpoint, self.pit_reached);
        self.buzzer.set(self.alarm.buzzer_on());

        // 5. Errors
        self.errors.update(
            now_ms,
            self.sampler.statuses(),
            pit,
            self.fan.current_percent(),
        );

        // 6. Predictor
        self.predictor.update(now_ms, epoch, meats);

        // 7. Session
        let point_flags = self.sample_flags(&readings);
        let fan_now = self.fan.current_percent();
        let damper_now = self.damper.position_percent();
        self.session.maybe_record(now_ms, epoch, |timestamp| DataPoint {
            timestamp,
            pit_x10: temp_to_x10(readings[0].temperature),
            meat1_x10: temp_to_x10(readings[1].temperature),
            meat2_x10: temp_to_x10(readings[2].temperature),
            fan_pct: fan_now,
            damper_pct: damper_now,
            flags: point_flags,
        });
        // Storage failures retry on the next flush interval
        let _ = self.session.maybe_flush(now_ms, &mut self.store);
    }

    /// Assemble the subscriber snapshot
    pub fn snapshot(&self) -> StateSnapshot {
        let readings = self.sampler.readings();
        let epoch = self.clock.epoch_seconds();

        let eta = |index: usize| {
            epoch.and_then(|now| {
                self.predictor
                    .prediction(index, now)
                    .map(|p| p.eta_epoch)
            })
        };

        let mut errors = Vec::new();
        for error in self.errors.active() {
            let _ = errors.push(error.message.clone());
        }

        StateSnapshot {
            monotonic_ms: self.clock.now_ms(),
            epoch_seconds: epoch,
            pit_temp: readings[0].valid(),
            meat1_temp: readings[1].valid(),
            meat2_temp: readings[2].valid(),
            setpoint: self.pid.setpoint(),
            fan_pct: self.fan.current_percent(),
            damper_pct: self.damper.position_percent(),
            lid_open: self.pid.is_lid_open(),
            meat1_eta_epoch: eta(0),
            meat2_eta_epoch: eta(1),
            errors,
        }
    }

    /// The regulator
    pub fn pid(&self) -> &PitPid {
        &self.pid
    }

    /// The fan actuator
    pub fn fan(&self) -> &FanActuator<P> {
        &self.fan
    }

    /// The damper actuator
    pub fn damper(&self) -> &DamperActuator<V> {
        &self.damper
    }

    /// The alarm monitor
    pub fn alarm(&self) -> &AlarmMonitor {
        &self.alarm
    }

    /// The error monitor
    pub fn errors(&self) -> &ErrorMonitor {
        &self.errors
    }

    /// The predictor
    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    /// The cook session
    pub fn session(&self) -> &CookSession<K> {
        &self.session
    }

    /// The probe sampler
    pub fn sampler(&self) -> &ProbeSampler<A> {
        &self.sampler
    }

    fn apply(&mut self, command: Command, epoch: Option<u32>) {
        match command {
            Command::SetSetpoint(setpoint) => {
                self.pid.set_setpoint(setpoint);
                self.pit_reached = false;
            }
            Command::SetMeatTarget { probe, target } => {
                let index = probe.index();
                self.alarm.set_meat_target(index, target);
                self.predictor.set_target(index, target);
            }
            Command::SetPitBand(band) => {
                // Invalid bands are rejected silently, keeping the prior value
                if band > 0.0 {
                    self.alarm.set_pit_band(band);
                }
            }
            Command::AcknowledgeAlarms => self.alarm.acknowledge(),
            Command::StartSession => {
                let _ = self
                    .session
                    .start_session(epoch.unwrap_or(0), &mut self.store);
            }
            Command::EndSession => {
                let _ = self.session.end_session(&mut self.store);
            }
            Command::ClearSession => {
                let _ = self.session.clear(&mut self.store);
            }
            Command::SetAlarmEnabled(enabled) => self.alarm.set_enabled(enabled),
            Command::SetPidEnabled(enabled) => self.pid.set_enabled(enabled),
            Command::SetLinkConnected(connected) => self.errors.set_link_connected(connected),
            Command::SetManualFan(duty) => self.fan.set_manual_duty(duty),
            Command::ResumeFanAuto => self.fan.off(),
        }
    }

    fn sample_flags(&self, readings: &[ProbeReading; 3]) -> u8 {
        let mut bits = 0u8;
        if self.pid.is_lid_open() {
            bits |= flags::LID_OPEN;
        }
        for kind in self.alarm.active() {
            bits |= match kind {
                AlarmKind::PitHigh | AlarmKind::PitLow => flags::ALARM_PIT,
                AlarmKind::Meat1Done => flags::ALARM_MEAT1,
                AlarmKind::Meat2Done => flags::ALARM_MEAT2,
            };
        }
        if self.errors.fire_out_active() {
            bits |= flags::FIRE_OUT;
        }
        if !readings[ProbeId::Pit.index()].status.is_ok() {
            bits |= flags::PIT_DISCONNECTED;
        }
        if !readings[ProbeId::Meat1.index()].status.is_ok() {
            bits |= flags::MEAT1_DISCONNECTED;
        }
        if !readings[ProbeId::Meat2.index()].status.is_ok() {
            bits |= flags::MEAT2_DISCONNECTED;
        }
        bits
    }
}

fn round_percent(value: f32) -> u8 {
    libm::roundf(value.clamp(0.0, 100.0)) as u8
}
