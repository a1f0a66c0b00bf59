//! Console line discipline tests, driven end to end through a mock UART

mod common;

use core::fmt::Write;

use common::{mock_bus, service, MockUart, TestOutput};
use serial_shell::console::{ClientInfo, CommandInfo, Console, Registry};
use serial_shell::logging::LOG_BUFFER_SIZE;
use serial_shell::{
    shell_info, shell_warn, ConsoleConfig, InstanceId, LogLevel, LogLevelCell, Logger, SerialBus,
    ShellError,
};

fn echo(argv: &[&str], out: &mut dyn Write) -> Result<(), ShellError> {
    let _ = writeln!(out, "{}", argv[2..].join(" "));
    Ok(())
}

static T_COMMANDS: [CommandInfo<'static>; 1] = [CommandInfo {
    name: "echo",
    help: "Echo arguments",
    handler: &echo,
}];

static T_CLIENT: ClientInfo<'static> = ClientInfo {
    name: "t",
    commands: &T_COMMANDS,
    log_level: None,
};

fn registry() -> Registry<'static> {
    let mut registry = Registry::new();
    registry.register(&T_CLIENT).unwrap();
    registry.register(&serial_shell::console::console::CLIENT).unwrap();
    registry
}

const ID: InstanceId = InstanceId::UART1;

/// Put `input` on the wire in UART-sized chunks, poll the console after each
/// chunk, and return everything it transmitted with CRs removed.
fn feed(bus: &SerialBus<MockUart>, console: &mut Console<'_, MockUart>, input: &[u8]) -> String {
    let hw = bus.hw(ID).unwrap();
    hw.clear_sent();

    let mut chunks = input.chunks(32).peekable();
    if chunks.peek().is_none() {
        console.poll().unwrap();
        service(bus, ID);
    }
    for chunk in chunks {
        hw.inject(chunk);
        service(bus, ID);
        console.poll().unwrap();
        service(bus, ID);
    }

    hw.sent_str().replace('\r', "")
}

#[test]
fn test_new_requires_open_instance() {
    let bus = mock_bus();
    let registry = registry();
    let logger = Logger::new();

    let result = Console::new(&bus, &registry, &logger, ConsoleConfig::default());
    assert!(matches!(result, Err(ShellError::InvalidState)));
}

#[test]
fn test_prompt_on_first_poll() {
    let bus = mock_bus();
    let registry = registry();
    let logger = Logger::new();
    let mut console = serial_shell::init(&bus, &registry, &logger, ConsoleConfig::default()).unwrap();

    assert!(console.is_start_of_line());
    assert_eq!(feed(&bus, &mut console, b""), "> ");
    assert!(!console.is_start_of_line());

    // No input, no new prompt
    assert_eq!(feed(&bus, &mut console, b""), "");
}

#[test]
fn test_echo_and_dispatch() {
    let bus = mock_bus();
    let registry = registry();
    let logger = Logger::new();
    let mut console = serial_shell::init(&bus, &registry, &logger, ConsoleConfig::default()).unwrap();

    assert_eq!(feed(&bus, &mut console, b"t echo hi\n"), "> t echo hi\nhi\n");
    assert!(console.is_start_of_line());
    assert_eq!(console.line(), "");

    assert_eq!(feed(&bus, &mut console, b""), "> ");
}

#[test]
fn test_prompt_before_next_line_in_same_poll() {
    let bus = mock_bus();
    let registry = registry();
    let logger = Logger::new();
    let mut console = serial_shell::init(&bus, &registry, &logger, ConsoleConfig::default()).unwrap();

    let out = feed(&bus, &mut console, b"t echo a\rt echo b\n");
    assert_eq!(out, "> t echo a\na\n> t echo b\nb\n");
}

#[test]
fn test_output_has_cr_after_nl() {
    let bus = mock_bus();
    let registry = registry();
    let logger = Logger::new();
    let mut console = serial_shell::init(&bus, &registry, &logger, ConsoleConfig::default()).unwrap();

    feed(&bus, &mut console, b"t echo x\n");
    let raw = bus.hw(ID).unwrap().sent();
    assert!(raw.ends_with(b"x\n\r"));
}

#[test]
fn test_backspace_edits_line() {
    let bus = mock_bus();
    let registry = registry();
    let logger = Logger::new();
    let mut console = serial_shell::init(&bus, &registry, &logger, ConsoleConfig::default()).unwrap();

    let out = feed(&bus, &mut console, b"t echo ab\x08c\n");
    assert_eq!(out, "> t echo ab\x08 \x08c\nac\n");
}

#[test]
fn test_delete_acts_as_backspace() {
    let bus = mock_bus();
    let registry = registry();
    let logger = Logger::new();
    let mut console = serial_shell::init(&bus, &registry, &logger, ConsoleConfig::default()).unwrap();

    let out = feed(&bus, &mut console, b"xy\x7f");
    assert_eq!(out, "> xy\x08 \x08");
    assert_eq!(console.line(), "x");
}

#[test]
fn test_backspace_on_empty_line_is_silent() {
    let bus = mock_bus();
    let registry = registry();
    let logger = Logger::new();
    let mut console = serial_shell::init(&bus, &registry, &logger, ConsoleConfig::default()).unwrap();

    assert_eq!(feed(&bus, &mut console, b"\x08\x08\x7f"), "> ");
    assert_eq!(console.line(), "");
}

#[test]
fn test_full_line_rings_bell() {
    let bus = mock_bus();
    let registry = registry();
    let logger = Logger::new();
    let mut console = serial_shell::init(&bus, &registry, &logger, ConsoleConfig::default()).unwrap();

    let capacity = serial_shell::config::CONSOLE_LINE_SIZE;
    let mut input = vec![b'a'; capacity];
    input.extend_from_slice(b"bc");

    let out = feed(&bus, &mut console, &input);
    let expected = format!("> {}\x07\x07", "a".repeat(capacity));
    assert_eq!(out, expected);
    assert_eq!(console.line().len(), capacity);

    // The full line still dispatches
    let out = feed(&bus, &mut console, b"\n");
    assert_eq!(out, format!("\nNo such command ({})\n", "a".repeat(capacity)));
}

#[test]
fn test_non_printable_ignored() {
    let bus = mock_bus();
    let registry = registry();
    let logger = Logger::new();
    let mut console = serial_shell::init(&bus, &registry, &logger, ConsoleConfig::default()).unwrap();

    assert_eq!(feed(&bus, &mut console, b"\x01\x1b\x00\x09"), "> ");
    assert_eq!(console.line(), "");
}

#[test]
fn test_log_toggle_twice() {
    let bus = mock_bus();
    let registry = registry();
    let logger = Logger::new();
    let mut console = serial_shell::init(&bus, &registry, &logger, ConsoleConfig::default()).unwrap();

    assert!(logger.is_active());
    let out = feed(&bus, &mut console, b"\x0c");
    assert_eq!(out, "> \n<Logging off>\n");
    assert!(!logger.is_active());

    let out = feed(&bus, &mut console, b"\x0c");
    assert_eq!(out, "\n<Logging on>\n");
    assert!(logger.is_active());
}

#[test]
fn test_toggle_keeps_partial_line() {
    let bus = mock_bus();
    let registry = registry();
    let logger = Logger::new();
    let mut console = serial_shell::init(&bus, &registry, &logger, ConsoleConfig::default()).unwrap();

    feed(&bus, &mut console, b"t ec\x0cho z\n");
    assert!(bus.hw(ID).unwrap().sent_str().ends_with("z\n\r"));
    assert!(!logger.is_active());
}

#[test]
fn test_errors_do_not_stop_console() {
    let bus = mock_bus();
    let registry = registry();
    let logger = Logger::new();
    let mut console = serial_shell::init(&bus, &registry, &logger, ConsoleConfig::default()).unwrap();

    let out = feed(&bus, &mut console, b"bogus\n");
    assert_eq!(out, "> bogus\nNo such command (bogus)\n");

    let out = feed(&bus, &mut console, b"t echo ok\n");
    assert_eq!(out, "> t echo ok\nok\n");
}

#[test]
fn test_console_log_level_command() {
    let bus = mock_bus();
    let registry = registry();
    let logger = Logger::new();
    let mut console = serial_shell::init(&bus, &registry, &logger, ConsoleConfig::default()).unwrap();

    let out = feed(&bus, &mut console, b"console log\n");
    assert_eq!(out, "> console log\nLog level for console = info\n");
}

#[test]
fn test_logs_drained_before_prompt() {
    let bus = mock_bus();
    let registry = registry();
    let logger = Logger::new();
    let cell = LogLevelCell::new(LogLevel::Info);
    let mut console = serial_shell::init(&bus, &registry, &logger, ConsoleConfig::default()).unwrap();

    shell_info!(logger, cell, "booted in {} ms", 12);
    shell_warn!(logger, cell, "low battery\n");

    assert_eq!(feed(&bus, &mut console, b""), "INFO booted in 12 ms\nWARN low battery\n> ");
    assert!(!logger.has_entries());
}

#[test]
fn test_logs_wait_for_start_of_line() {
    let bus = mock_bus();
    let registry = registry();
    let logger = Logger::new();
    let cell = LogLevelCell::new(LogLevel::Info);
    let mut console = serial_shell::init(&bus, &registry, &logger, ConsoleConfig::default()).unwrap();

    feed(&bus, &mut console, b"t ec");
    shell_info!(logger, cell, "later");

    // Mid-line: the entry stays queued
    assert_eq!(feed(&bus, &mut console, b"ho"), "ho");
    assert!(logger.has_entries());

    assert_eq!(feed(&bus, &mut console, b"\n"), "\n\n");
    assert_eq!(feed(&bus, &mut console, b""), "INFO later\n> ");
}

#[test]
fn test_muted_logs_are_not_queued() {
    let bus = mock_bus();
    let registry = registry();
    let logger = Logger::new();
    let cell = LogLevelCell::new(LogLevel::Info);
    let mut console = serial_shell::init(&bus, &registry, &logger, ConsoleConfig::default()).unwrap();

    feed(&bus, &mut console, b"\x0c");
    assert!(!shell_info!(logger, cell, "hidden"));
    assert!(!logger.has_entries());
}

#[test]
fn test_dropped_logs_reported() {
    let bus = mock_bus();
    let registry = registry();
    let logger = Logger::new();
    let cell = LogLevelCell::new(LogLevel::Trace);
    let mut console = serial_shell::init(&bus, &registry, &logger, ConsoleConfig::default()).unwrap();

    let total = LOG_BUFFER_SIZE + 4;
    for i in 0..total {
        shell_info!(logger, cell, "entry {}", i);
    }

    let out = feed(&bus, &mut console, b"");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), LOG_BUFFER_SIZE - 1 + 2);
    assert_eq!(lines[0], "INFO entry 0");
    assert_eq!(lines[LOG_BUFFER_SIZE - 1], "<5 log entries dropped>");
    assert_eq!(lines[LOG_BUFFER_SIZE], "> ");
}

#[test]
fn test_process_byte_reports_dispatch_result() {
    let bus = mock_bus();
    let registry = registry();
    let logger = Logger::new();
    let mut console = serial_shell::init(&bus, &registry, &logger, ConsoleConfig::default()).unwrap();
    let mut out = TestOutput::new();

    for b in b"nope" {
        assert_eq!(console.process_byte(*b, &mut out), None);
    }
    assert_eq!(console.process_byte(b'\r', &mut out), Some(Err(ShellError::BadCommand)));
    assert_eq!(console.process_byte(b'\n', &mut out), Some(Ok(())));
    assert_eq!(out.as_str(), "nope\nNo such command (nope)\n\n");
}

#[test]
fn test_console_on_other_instance() {
    let bus = mock_bus();
    let registry = registry();
    let logger = Logger::new();
    let config = ConsoleConfig {
        instance: InstanceId::UART6,
    };
    let mut console = serial_shell::init(&bus, &registry, &logger, config).unwrap();

    let hw = bus.hw(InstanceId::UART6).unwrap();
    hw.inject(b"t echo six\n");
    service(&bus, InstanceId::UART6);
    console.poll().unwrap();
    service(&bus, InstanceId::UART6);

    assert_eq!(hw.sent_str(), "> t echo six\n\rsix\n\r");
    assert!(bus.hw(ID).unwrap().sent().is_empty());
    assert!(!bus.is_open(ID));
}

#[test]
fn test_banner_shows_version() {
    let bus = mock_bus();
    let registry = registry();
    let logger = Logger::new();
    let console = serial_shell::init(&bus, &registry, &logger, ConsoleConfig::default()).unwrap();
    let mut out = TestOutput::new();

    console.print_banner(&mut out);
    assert!(out.contains(serial_shell::console::VERSION));
    assert!(serial_shell::console::VERSION.starts_with("SerialShell v"));
}
