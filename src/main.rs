//! SerialShell - Main entry point
//!
//! 1. Bring up the serial bus (one UART carries the console)
//! 2. Register the demo `sys` client and the console's own log client
//! 3. Start the "interrupt" context: a thread on the host, a task on ESP-IDF
//! 4. Poll the console forever, halting on an unrecoverable fault
//!
//! On the host, stdin/stdout stand in for UART1. The terminal stays in
//! line mode, so input is echoed twice and only reaches the shell on Enter.

use core::fmt::Write;
use core::sync::atomic::{AtomicU32, Ordering};

use serial_shell::console::{self, parse_args, ArgValue, ClientInfo, CommandInfo, Registry};
use serial_shell::{
    shell_debug, shell_info, ConsoleConfig, FaultState, InstanceId, LogLevel, LogLevelCell,
    Logger, ShellError,
};

static LOGGER: Logger = Logger::new();

// ============================================================================
// Demo client
// ============================================================================

static SYS_LOG_LEVEL: LogLevelCell = LogLevelCell::new(LogLevel::DEFAULT);

/// Commands run since startup.
static SYS_RUNS: AtomicU32 = AtomicU32::new(0);

static SYS_COMMANDS: [CommandInfo<'static>; 3] = [
    CommandInfo {
        name: "info",
        help: "Show version and counters, usage: sys info",
        handler: &cmd_info,
    },
    CommandInfo {
        name: "echo",
        help: "Print the arguments back, usage: sys echo [args...]",
        handler: &cmd_echo,
    },
    CommandInfo {
        name: "args",
        help: "Parse typed arguments, usage: sys args <int> [<uint> [<hex addr>]]",
        handler: &cmd_args,
    },
];

static SYS_CLIENT: ClientInfo<'static> = ClientInfo {
    name: "sys",
    commands: &SYS_COMMANDS,
    log_level: Some(&SYS_LOG_LEVEL),
};

fn cmd_info(_argv: &[&str], out: &mut dyn Write) -> Result<(), ShellError> {
    let runs = SYS_RUNS.fetch_add(1, Ordering::Relaxed) + 1;
    let _ = writeln!(out, "{}", console::VERSION);
    let _ = writeln!(out, "commands run: {}", runs);
    let _ = writeln!(out, "log output: {}", if LOGGER.is_active() { "on" } else { "off" });
    shell_debug!(LOGGER, SYS_LOG_LEVEL, "info requested");
    Ok(())
}

fn cmd_echo(argv: &[&str], out: &mut dyn Write) -> Result<(), ShellError> {
    SYS_RUNS.fetch_add(1, Ordering::Relaxed);
    let args = argv.get(2..).unwrap_or(&[]);
    for (idx, arg) in args.iter().enumerate() {
        let _ = write!(out, "{}{}", if idx == 0 { "" } else { " " }, arg);
    }
    let _ = writeln!(out);
    Ok(())
}

fn cmd_args(argv: &[&str], out: &mut dyn Write) -> Result<(), ShellError> {
    SYS_RUNS.fetch_add(1, Ordering::Relaxed);
    let values = parse_args(argv.get(2..).unwrap_or(&[]), "i[u[p]]", out)?;

    for value in &values {
        match *value {
            ArgValue::Int(v) => {
                let _ = writeln!(out, "int:  {}", v);
            }
            ArgValue::Uint(v) => {
                let _ = writeln!(out, "uint: {}", v);
            }
            ArgValue::Ptr(v) => {
                let _ = writeln!(out, "ptr:  0x{:08x}", v);
            }
            ArgValue::Str(v) => {
                let _ = writeln!(out, "str:  {}", v);
            }
        }
    }
    shell_info!(LOGGER, SYS_LOG_LEVEL, "parsed {} argument(s)", values.len());
    Ok(())
}

/// Clients known to the console, in help order.
fn build_registry() -> Result<Registry<'static>, ShellError> {
    let mut registry = Registry::new();
    registry.register(&SYS_CLIENT)?;
    registry.register(&console::console::CLIENT)?;
    Ok(registry)
}

fn report_fault(fault: &FaultState) {
    let snap = fault.snapshot();
    eprintln!(
        "FAULT: {} (instance {}, count {})",
        snap.code.as_str(),
        snap.data,
        snap.count
    );
}

// ============================================================================
// Host build: stdin/stdout as UART1
// ============================================================================

#[cfg(not(target_os = "espidf"))]
mod host {
    use std::collections::VecDeque;
    use std::io::{Read, Write};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    use serial_shell::{InstanceId, SerialBus, UartHw, UartStatus};

    /// Software UART: bytes arrive from a feeder thread, leave on stdout.
    pub struct HostUart {
        rx: Mutex<VecDeque<u8>>,
        rx_irq: AtomicBool,
        tx_irq: AtomicBool,
        console: bool,
    }

    impl HostUart {
        pub fn new(console: bool) -> Self {
            Self {
                rx: Mutex::new(VecDeque::new()),
                rx_irq: AtomicBool::new(false),
                tx_irq: AtomicBool::new(false),
                console,
            }
        }

        pub fn feed(&self, bytes: &[u8]) {
            if let Ok(mut rx) = self.rx.lock() {
                rx.extend(bytes.iter().copied());
            }
        }

        fn rx_waiting(&self) -> bool {
            self.rx.lock().map(|rx| !rx.is_empty()).unwrap_or(false)
        }
    }

    impl UartHw for HostUart {
        fn status(&self) -> UartStatus {
            let mut bits = 0;
            if self.rx_irq.load(Ordering::Acquire) && self.rx_waiting() {
                bits |= UartStatus::RXNE;
            }
            if self.tx_irq.load(Ordering::Acquire) {
                bits |= UartStatus::TXE;
            }
            UartStatus::new(bits)
        }

        fn read_data(&self) -> u8 {
            self.rx
                .lock()
                .ok()
                .and_then(|mut rx| rx.pop_front())
                .unwrap_or(0)
        }

        fn write_data(&self, byte: u8) {
            if !self.console {
                return;
            }
            let mut stdout = std::io::stdout().lock();
            let _ = stdout.write_all(&[byte]);
            let _ = stdout.flush();
        }

        fn set_rx_interrupt(&self, enabled: bool) {
            self.rx_irq.store(enabled, Ordering::Release);
        }

        fn set_tx_interrupt(&self, enabled: bool) {
            self.tx_irq.store(enabled, Ordering::Release);
        }

        fn enable_irq(&self, _priority: u8) {}
    }

    /// Time one byte takes on a 115200 baud wire.
    const BYTE_TIME: Duration = Duration::from_micros(87);

    /// Copy stdin into the console UART until EOF, paced at wire speed so a
    /// pasted line cannot outrun the receive ring.
    pub fn spawn_stdin_feeder(bus: &'static SerialBus<HostUart>, id: InstanceId) {
        thread::spawn(move || {
            let mut stdin = std::io::stdin().lock();
            let mut buf = [0u8; 64];
            loop {
                let n = match stdin.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => n,
                };
                let Some(hw) = bus.hw(id) else {
                    break;
                };
                for &byte in &buf[..n] {
                    hw.feed(&[byte]);
                    thread::sleep(BYTE_TIME);
                }
            }
        });
    }

    /// Interrupt context: service the UART while it has something pending.
    pub fn spawn_irq(bus: &'static SerialBus<HostUart>, id: InstanceId) {
        thread::spawn(move || loop {
            let pending = bus.hw(id).map(|hw| hw.status() != UartStatus::IDLE).unwrap_or(false);
            if pending {
                bus.on_interrupt(id);
            } else {
                thread::sleep(Duration::from_micros(200));
            }
        });
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() -> Result<(), ShellError> {
    use host::HostUart;
    use serial_shell::SerialBus;

    let config = ConsoleConfig::default();
    let bus: &'static SerialBus<HostUart> = Box::leak(Box::new(SerialBus::new([
        HostUart::new(config.instance == InstanceId::UART1),
        HostUart::new(config.instance == InstanceId::UART5),
        HostUart::new(config.instance == InstanceId::UART6),
    ])));
    let registry = build_registry()?;

    let mut console = serial_shell::init(bus, &registry, &LOGGER, config)?;
    host::spawn_irq(bus, config.instance);
    host::spawn_stdin_feeder(bus, config.instance);

    console.print_banner(&mut bus.stream(config.instance)?);
    shell_info!(LOGGER, SYS_LOG_LEVEL, "shell ready on {}", config.instance.name());

    loop {
        console.poll()?;

        if bus.fault().is_active() {
            report_fault(bus.fault());
            std::process::exit(1);
        }

        std::thread::sleep(std::time::Duration::from_millis(1));
    }
}

// ============================================================================
// ESP-IDF build: UART driver as UART1
// ============================================================================

#[cfg(target_os = "espidf")]
mod esp {
    use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
    use std::sync::Mutex;

    use esp_idf_svc::hal::uart::UartDriver;
    use serial_shell::{UartHw, UartStatus};

    /// Marks `staged` as holding a byte.
    const STAGED: u16 = 0x100;

    /// UART driver seen through the register-level boundary.
    ///
    /// The driver buffers in its own FIFO; one byte is staged so `status`
    /// can report RXNE before `read_data` takes it. Instances without a
    /// driver are inert.
    pub struct EspUart {
        driver: Option<Mutex<UartDriver<'static>>>,
        staged: AtomicU16,
        rx_irq: AtomicBool,
        tx_irq: AtomicBool,
    }

    impl EspUart {
        pub fn new(driver: Option<UartDriver<'static>>) -> Self {
            Self {
                driver: driver.map(Mutex::new),
                staged: AtomicU16::new(0),
                rx_irq: AtomicBool::new(false),
                tx_irq: AtomicBool::new(false),
            }
        }

        fn stage_rx(&self) -> bool {
            if self.staged.load(Ordering::Acquire) & STAGED != 0 {
                return true;
            }
            let Some(driver) = &self.driver else {
                return false;
            };
            let mut byte = [0u8; 1];
            let read = driver
                .lock()
                .map(|uart| uart.read(&mut byte, 0).unwrap_or(0))
                .unwrap_or(0);
            if read == 0 {
                return false;
            }
            self.staged.store(STAGED | byte[0] as u16, Ordering::Release);
            true
        }
    }

    impl UartHw for EspUart {
        fn status(&self) -> UartStatus {
            let mut bits = 0;
            if self.rx_irq.load(Ordering::Acquire) && self.stage_rx() {
                bits |= UartStatus::RXNE;
            }
            if self.tx_irq.load(Ordering::Acquire) && self.driver.is_some() {
                bits |= UartStatus::TXE;
            }
            UartStatus::new(bits)
        }

        fn read_data(&self) -> u8 {
            (self.staged.swap(0, Ordering::AcqRel) & 0xff) as u8
        }

        fn write_data(&self, byte: u8) {
            if let Some(driver) = &self.driver {
                if let Ok(uart) = driver.lock() {
                    let _ = uart.write(&[byte]);
                }
            }
        }

        fn set_rx_interrupt(&self, enabled: bool) {
            self.rx_irq.store(enabled, Ordering::Release);
        }

        fn set_tx_interrupt(&self, enabled: bool) {
            self.tx_irq.store(enabled, Ordering::Release);
        }

        fn enable_irq(&self, _priority: u8) {}
    }
}

#[cfg(target_os = "espidf")]
fn main() {
    use esp_idf_svc::hal::delay::FreeRtos;
    use esp_idf_svc::hal::gpio::AnyIOPin;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::prelude::*;
    use esp_idf_svc::hal::uart::{config::Config as UartConfig, UartDriver};
    use serial_shell::{SerialBus, UartHw, UartStatus};

    use esp::EspUart;

    // Initialize ESP-IDF
    esp_idf_svc::sys::link_patches();

    let Ok(peripherals) = Peripherals::take() else {
        println!("peripherals already taken");
        return;
    };
    let uart = match UartDriver::new(
        peripherals.uart1,
        peripherals.pins.gpio17,
        peripherals.pins.gpio18,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(115_200)),
    ) {
        Ok(uart) => uart,
        Err(e) => {
            println!("UART1 init failed: {}", e);
            return;
        }
    };

    let config = ConsoleConfig::default();
    let bus: &'static SerialBus<EspUart> = Box::leak(Box::new(SerialBus::new([
        EspUart::new(Some(uart)),
        EspUart::new(None),
        EspUart::new(None),
    ])));

    let registry = match build_registry() {
        Ok(registry) => registry,
        Err(e) => {
            println!("registry: {}", e);
            return;
        }
    };
    let mut console = match serial_shell::init(bus, &registry, &LOGGER, config) {
        Ok(console) => console,
        Err(e) => {
            println!("console init failed: {}", e);
            return;
        }
    };

    // Interrupt context
    let irq_id = config.instance;
    let _ = std::thread::Builder::new()
        .stack_size(4096)
        .spawn(move || loop {
            let pending = bus.hw(irq_id).map(|hw| hw.status() != UartStatus::IDLE);
            if pending.unwrap_or(false) {
                bus.on_interrupt(irq_id);
            } else {
                FreeRtos::delay_ms(1);
            }
        });

    if let Ok(mut out) = bus.stream(config.instance) {
        console.print_banner(&mut out);
    }
    shell_info!(LOGGER, SYS_LOG_LEVEL, "shell ready on {}", config.instance.name());

    loop {
        if let Err(e) = console.poll() {
            println!("console: {}", e);
        }

        if bus.fault().is_active() {
            report_fault(bus.fault());
            FreeRtos::delay_ms(100);
            esp_idf_svc::hal::reset::restart();
        }

        FreeRtos::delay_ms(10);
    }
}
