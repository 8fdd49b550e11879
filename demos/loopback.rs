//! Loopback self-test and TCP echo demo for the hdlcframe protocol.
//!
//! Frame the reference messages into a buffer and decode them again:
//!   cargo run --example loopback
//!
//! Echo frames over TCP (server, then client in another terminal):
//!   cargo run --example loopback server
//!   cargo run --example loopback client

use std::cell::RefCell;
use std::collections::VecDeque;
use std::env;
use std::io::{self, BufRead};
use std::net::{TcpListener, TcpStream};
use std::rc::Rc;
use std::thread;

use hdlcframe::{
    sink_fn, source_fn, Checksum, Crc16, Crc32, Deframer, Error, FrameReader, FrameWriter,
    Framer, MessageQueue,
};

fn main() {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        None | Some("selftest") => {
            let ok = run_selftest::<Crc16>("CRC-16/X.25") & run_selftest::<Crc32>("CRC-32");
            std::process::exit(if ok { 0 } else { 1 });
        }
        Some("server") => run_server(),
        Some("client") => run_client(),
        Some(other) => {
            eprintln!("Unknown mode: {}", other);
            eprintln!("Usage: {} [selftest|server|client]", args[0]);
            std::process::exit(1);
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn run_selftest<C: Checksum + Default>(name: &str) -> bool {
    println!("== {}", name);
    let messages: [&[u8]; 3] = [&[0x00], b"~}", b""];

    // The "wire": whatever the framer writes, the deframer polls back.
    let wire = Rc::new(RefCell::new(VecDeque::new()));

    let tx_wire = Rc::clone(&wire);
    let mut framer: Framer<_, C> =
        Framer::new(sink_fn(move |byte| tx_wire.borrow_mut().push_back(byte)));
    for message in &messages {
        framer.transmit_frame(message);
    }
    println!("TX  {}", hex(&wire.borrow().iter().copied().collect::<Vec<_>>()));

    let rx_wire = Rc::clone(&wire);
    let mut deframer: Deframer<_, C> =
        Deframer::new(source_fn(move || rx_wire.borrow_mut().pop_front()));
    let mut queue = MessageQueue::new();
    while !wire.borrow().is_empty() {
        let len = deframer.receive(&mut queue);
        if len > 0 {
            println!("RX  frame with {} payload bytes", len);
        }
    }

    for message in &queue {
        println!("MSG {}", hex(message));
    }
    let ok = queue.iter().map(Vec::as_slice).eq(messages.iter().copied());
    println!("{}", if ok { "PASS" } else { "FAIL" });
    ok
}

fn run_server() {
    let listener = TcpListener::bind("127.0.0.1:8080").unwrap();
    println!("Echo server listening on 127.0.0.1:8080");

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                println!("New client connected: {}", stream.peer_addr().unwrap());
                thread::spawn(|| handle_client(stream));
            }
            Err(e) => eprintln!("Connection failed: {}", e),
        }
    }
}

fn handle_client(stream: TcpStream) {
    let peer = stream.peer_addr().unwrap();
    let read_stream = stream.try_clone().unwrap();

    let mut reader: FrameReader<_, Crc16> = FrameReader::new(read_stream);
    let mut writer: FrameWriter<_, Crc16> = FrameWriter::new(stream);

    loop {
        match reader.read_message() {
            Ok(message) => {
                println!("[{}] Received: {}", peer, hex(&message));
                if let Err(e) = writer.write_message(&message).and_then(|_| writer.flush()) {
                    eprintln!("[{}] Write error: {}", peer, e);
                    break;
                }
            }
            Err(Error::UnexpectedEof) => {
                println!(
                    "[{}] Client disconnected ({} corrupt frames)",
                    peer,
                    reader.stats().checksum_errors
                );
                break;
            }
            Err(e) => {
                eprintln!("[{}] Read error: {}", peer, e);
                break;
            }
        }
    }
}

fn run_client() {
    let stream = TcpStream::connect("127.0.0.1:8080").unwrap();
    println!("Connected to server");

    let read_stream = stream.try_clone().unwrap();
    let mut reader: FrameReader<_, Crc16> = FrameReader::new(read_stream);
    let mut writer: FrameWriter<_, Crc16> = FrameWriter::new(stream);

    let receiver = thread::spawn(move || loop {
        match reader.read_message() {
            Ok(message) => println!("← Received: {}", hex(&message)),
            Err(Error::UnexpectedEof) => {
                println!("Server disconnected");
                break;
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }
    });

    println!("\nCommands:");
    println!("  hex <bytes>  - Send raw bytes (e.g., 'hex 7E 7D 00')");
    println!("  <text>       - Send text as bytes");
    println!("  quit         - Exit\n");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.unwrap();
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "quit" {
            break;
        }

        let message: Vec<u8> = match trimmed.strip_prefix("hex ") {
            Some(hex_str) => hex_str
                .split_whitespace()
                .filter_map(|s| u8::from_str_radix(s, 16).ok())
                .collect(),
            None => trimmed.as_bytes().to_vec(),
        };

        println!("→ Sending: {}", hex(&message));
        if let Err(e) = writer.write_message(&message).and_then(|_| writer.flush()) {
            eprintln!("Send error: {}", e);
            break;
        }
    }

    println!("Exiting...");
    receiver.join().ok();
}
