use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use lorakiss_bridge::{Bridge, BridgeConfig, KissServer, ServerConfig};
use tracing::info;

use crate::cmd::ServeArgs;
use crate::exit::{bridge_error, io_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE};
use crate::radio::{receive_loop, UdpRadio};

pub fn run(args: ServeArgs) -> CliResult<i32> {
    let config = load_config(&args)?;
    let bridge = Arc::new(Bridge::new(config));

    let server_config = ServerConfig {
        bind: args.bind.clone(),
        ..ServerConfig::default()
    };
    let server = Arc::new(
        KissServer::bind(server_config, Arc::clone(&bridge))
            .map_err(|err| bridge_error("KISS bind failed", err))?,
    );
    let mut radio = UdpRadio::bind(&args.radio_bind, &args.radio_peer)
        .map_err(|err| io_error("radio bind failed", err))?;
    let rx_socket = radio
        .receiver()
        .map_err(|err| io_error("radio socket clone failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let radio_addr = radio
        .local_addr()
        .map_err(|err| io_error("radio address", err))?;
    info!(
        kiss = %server.local_addr(),
        radio = %radio_addr,
        radio_peer = %radio.peer(),
        dialect = %bridge.config().tx_dialect,
        "TNC running"
    );

    // Blocks in accept; torn down with the process.
    spawn_named("kiss-accept", {
        let server = Arc::clone(&server);
        let running = Arc::clone(&running);
        move || server.run(&running)
    })?;

    let receiver = spawn_named("radio-rx", {
        let bridge = Arc::clone(&bridge);
        let running = Arc::clone(&running);
        let (rssi, snr) = (args.rx_rssi, args.rx_snr);
        move || receive_loop(rx_socket, bridge, running, rssi, snr)
    })?;

    let transmitter = spawn_named("radio-tx", {
        let bridge = Arc::clone(&bridge);
        let running = Arc::clone(&running);
        move || bridge.run_transmitter(&mut radio, &running)
    })?;

    let _ = transmitter.join();
    let _ = receiver.join();
    info!(pending = bridge.queue().len(), "TNC stopped");
    Ok(SUCCESS)
}

fn load_config(args: &ServeArgs) -> CliResult<BridgeConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|err| io_error(&format!("reading {}", path.display()), err))?;
            BridgeConfig::from_json(&text).map_err(|err| bridge_error("invalid config", err))?
        }
        None => BridgeConfig::default(),
    };

    if let Some(dialect) = args.dialect {
        config.tx_dialect = dialect.into();
    }
    if args.no_signal_report {
        config.append_signal_report = false;
    }
    if let Some(interval) = &args.poll_interval {
        config.poll_interval_ms = parse_duration(interval)?
            .as_millis()
            .try_into()
            .map_err(|_| CliError::new(USAGE, "poll interval too large"))?;
    }
    Ok(config)
}

fn spawn_named<F>(name: &str, body: F) -> CliResult<thread::JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(body)
        .map_err(|err| io_error(&format!("spawning {name}"), err))
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    let (number, millis) = match input.strip_suffix("ms") {
        Some(number) => (number, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration: {input:?}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
