use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Mutex;
use std::thread::{self, JoinHandle};

use clap::Parser;
use color_eyre::eyre::{self, Context};
use crossbeam_channel::Receiver;
use debugger::Breakpoint;
use tracing_subscriber::filter::EnvFilter;
use transport::{ChannelError, Client, ClientReader, ClientWriter, Command, DEFAULT_PORT};

struct App {
    writer: ClientWriter,
    input_rx: Receiver<String>,
    server_rx: Receiver<Result<String, ChannelError>>,

    #[allow(dead_code)]
    input_thread: JoinHandle<()>,
    #[allow(dead_code)]
    server_thread: JoinHandle<()>,
}

impl App {
    fn new(client: Client) -> Self {
        let (reader, writer) = client.into_split();

        // handle input
        let (input_tx, input_rx) = crossbeam_channel::unbounded();
        let input_thread = thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if input_tx.send(line).is_err() {
                    break;
                }
            }
        });

        let (server_tx, server_rx) = crossbeam_channel::unbounded();
        let server_thread = thread::spawn(move || read_server_lines(reader, server_tx));

        Self {
            writer,
            input_rx,
            server_rx,
            input_thread,
            server_thread,
        }
    }

    fn loop_step(&mut self) -> eyre::Result<ShouldQuit> {
        crossbeam_channel::select! {
            recv(self.input_rx) -> input => match input {
                Ok(input) => self.handle_input(&input).context("handling input"),
                // stdin closed
                Err(_) => Ok(ShouldQuit::True),
            },
            recv(self.server_rx) -> line => match line {
                Ok(Ok(line)) => {
                    println!("{line}");
                    Ok(ShouldQuit::False)
                }
                Ok(Err(e)) => Err(e).context("reading from server"),
                Err(_) => {
                    println!("server closed the connection");
                    Ok(ShouldQuit::True)
                }
            },
        }
    }

    fn handle_input(&mut self, input: &str) -> eyre::Result<ShouldQuit> {
        if input == "exit" {
            return Ok(ShouldQuit::True);
        }
        if let Err(e) = Command::parse(input) {
            println!("warning: {e}; the server will ignore this line");
        }
        tracing::debug!(%input, "forwarding line");
        self.writer
            .write_line(&format!("{input}\n"))
            .context("sending line to server")?;
        Ok(ShouldQuit::False)
    }
}

fn read_server_lines(
    mut reader: ClientReader,
    tx: crossbeam_channel::Sender<Result<String, ChannelError>>,
) {
    loop {
        match reader.read_line() {
            Ok(line) => {
                if tx.send(Ok(line)).is_err() {
                    break;
                }
            }
            Err(ChannelError::Closed) => break,
            Err(e) => {
                let _ = tx.send(Err(e));
                break;
            }
        }
    }
}

/// Interactive client for the debugger control protocol
#[derive(Debug, Parser)]
struct Args {
    /// Host the control server is running on
    #[clap(long, default_value = "127.0.0.1")]
    host: String,

    /// Port the control server is listening on
    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Breakpoints (FILE:LINE) to set as soon as the connection is made
    #[clap(short, long = "break")]
    breakpoints: Vec<Breakpoint>,

    /// Write logs to this file instead of stderr
    #[clap(long)]
    log_file: Option<PathBuf>,
}

fn main() -> eyre::Result<()> {
    color_eyre::install().context("installing color_eyre")?;
    let args = Args::parse();

    match &args.log_file {
        Some(path) => {
            let log_file = std::fs::File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .with_writer(Mutex::new(log_file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .with_writer(std::io::stderr)
                .init();
        }
    }

    let mut client = Client::connect((args.host.as_str(), args.port))
        .with_context(|| format!("connecting to {}:{}", args.host, args.port))?;
    for breakpoint in args.breakpoints {
        tracing::debug!(%breakpoint, "adding breakpoint");
        client
            .send(&Command::SetBreakpoint {
                file: breakpoint.file,
                line: breakpoint.line,
            })
            .context("adding breakpoint")?;
    }

    let mut app = App::new(client);
    tracing::debug!("connected");
    loop {
        match app.loop_step() {
            Ok(ShouldQuit::True) => break,
            Ok(ShouldQuit::False) => {}
            Err(e) => eyre::bail!("Error running command: {e:#}"),
        }
    }

    Ok(())
}

enum ShouldQuit {
    True,
    False,
}
