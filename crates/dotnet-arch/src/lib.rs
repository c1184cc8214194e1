//! Executable Architecture Detector (C3): byte-level PE/Mach-O/ELF header
//! parsing per spec.md §4.4's literal offset table.
//!
//! This is hand-rolled rather than routed through a whole-file format-parsing
//! crate (the retrieval pack's `chaifeng-ghri` reaches for `goblin` for a
//! similar "is this a native binary" check) because the spec's contract is
//! narrower and stricter than a general object-file parse: read exactly the
//! declared window (64 bytes, plus — for PE only — a second bounded read at
//! the header offset the first window revealed), and never throw. Hand
//! parsing the four fixed-offset fields the spec names is a more faithful
//! implementation of that contract than delegating to a parser built to
//! understand whole object files.

use dotnet_types::Architecture;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

const HEADER_WINDOW: usize = 64;

/// Detect the architecture of the executable at `path`. Returns `None` on
/// any parse/IO failure or unrecognized format — this function never panics
/// and never returns an `Err`, per spec.md §4.4 ("must never throw").
pub fn detect(path: &Path) -> Option<Architecture> {
    let mut file = File::open(path).ok()?;
    let mut header = [0u8; HEADER_WINDOW];
    let read = file.read(&mut header).ok()?;
    if read < HEADER_WINDOW {
        return None;
    }

    if &header[0..4] == b"\x7FELF" {
        return Some(detect_elf(&header));
    }
    if header[0..4] == [0xCF, 0xFA, 0xED, 0xFE] {
        return Some(detect_mach_o(&header));
    }
    if &header[0..2] == b"MZ" {
        return detect_pe(&mut file, &header);
    }
    None
}

fn detect_elf(header: &[u8; HEADER_WINDOW]) -> Architecture {
    let e_machine = u16::from_le_bytes([header[0x12], header[0x13]]);
    match e_machine {
        0x03 => Architecture::X86,
        0x3E => Architecture::X64,
        0xB7 => Architecture::Arm64,
        _ => Architecture::Other,
    }
}

fn detect_mach_o(header: &[u8; HEADER_WINDOW]) -> Architecture {
    let cputype = u32::from_le_bytes([header[0x04], header[0x05], header[0x06], header[0x07]]);
    match cputype {
        0x7 => Architecture::X86,
        0x0100_0007 => Architecture::X64,
        0x0100_000C => Architecture::Arm64,
        _ => Architecture::Other,
    }
}

/// PE's architecture field lives past the DOS stub, at an offset the first
/// 64-byte window only points to (`e_lfanew` at 0x3C) rather than contains.
/// We seek there and read exactly the 6 bytes we need (4-byte `"PE\0\0"`
/// signature + 2-byte machine), nothing more.
fn detect_pe(file: &mut File, header: &[u8; HEADER_WINDOW]) -> Option<Architecture> {
    let e_lfanew = u32::from_le_bytes([header[0x3C], header[0x3D], header[0x3E], header[0x3F]]);

    file.seek(SeekFrom::Start(e_lfanew as u64)).ok()?;
    let mut pe_header = [0u8; 6];
    file.read_exact(&mut pe_header).ok()?;

    if &pe_header[0..4] != b"PE\0\0" {
        return None;
    }
    let machine = u16::from_le_bytes([pe_header[4], pe_header[5]]);
    Some(match machine {
        0x014C => Architecture::X86,
        0x8664 => Architecture::X64,
        0xAA64 => Architecture::Arm64,
        _ => Architecture::Other,
    })
}
