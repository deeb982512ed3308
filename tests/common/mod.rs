//! Loopback stand-in for ftserver, shared by the integration tests

#![allow(dead_code)]

use anyhow::Result;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

pub fn free_port() -> Result<u16> {
    let sock = TcpListener::bind("127.0.0.1:0")?;
    let p = sock.local_addr()?.port();
    drop(sock);
    Ok(p)
}

/// Read one command, connect back to the transfer port it names, write
/// `reply` in small chunks, close. Returns the command text.
pub fn fake_server(reply: &'static [u8]) -> Result<(u16, thread::JoinHandle<Result<String>>)> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    let handle = thread::spawn(move || -> Result<String> {
        let (mut control, _) = listener.accept()?;
        let mut buf = [0u8; 1024];
        let n = control.read(&mut buf)?;
        let command = String::from_utf8_lossy(&buf[..n]).to_string();
        let transfer_port: u16 = command
            .split_whitespace()
            .last()
            .ok_or_else(|| anyhow::anyhow!("empty command"))?
            .parse()?;

        // The client binds its listener only after sending the command
        let mut data = None;
        for _ in 0..100u32 {
            match TcpStream::connect(("127.0.0.1", transfer_port)) {
                Ok(s) => {
                    data = Some(s);
                    break;
                }
                Err(_) => thread::sleep(Duration::from_millis(20)),
            }
        }
        let mut data = data.ok_or_else(|| anyhow::anyhow!("client never listened"))?;
        for chunk in reply.chunks(5) {
            data.write_all(chunk)?;
        }
        drop(data);
        Ok(command)
    });
    Ok((port, handle))
}
