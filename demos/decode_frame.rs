//! Basic usage example for wirebound
//!
//! Run with: cargo run --example decode_frame

use std::io::Cursor;

use wirebound::{
    decode_frame, Error, FieldDescriptor, FieldKind, Record, RecordDescriptor, Value, VersionTag,
};

#[derive(Debug, Default)]
struct JoinRequest {
    member_id: i32,
    group: String,
    rack: String,
}

impl Value for JoinRequest {
    fn field_mut(&mut self, index: usize) -> &mut dyn Value {
        match index {
            0 => &mut self.member_id,
            1 => &mut self.group,
            2 => &mut self.rack,
            _ => panic!("JoinRequest has no field {index}"),
        }
    }
}

impl Record for JoinRequest {
    fn descriptor() -> &'static RecordDescriptor {
        static DESC: RecordDescriptor = RecordDescriptor {
            name: "JoinRequest",
            self_decoding: false,
            fields: &[
                FieldDescriptor {
                    name: "member_id",
                    kind: FieldKind::Int32,
                    tags: &[VersionTag::new(0, i16::MAX)],
                },
                FieldDescriptor {
                    name: "group",
                    kind: FieldKind::String,
                    tags: &[VersionTag::new(0, i16::MAX)],
                },
                FieldDescriptor {
                    name: "rack",
                    // Joined the protocol at v1, compact-encoded
                    kind: FieldKind::String,
                    tags: &[VersionTag::compact(1, i16::MAX)],
                },
            ],
        };
        &DESC
    }
}

fn main() -> Result<(), Error> {
    println!("wirebound basic usage");
    println!("=====================");

    // Example 1: decode a v0 frame (no rack field on the wire)
    println!("\n1. Version 0 frame:");
    {
        let frame = [
            0x00, 0x00, 0x00, 0x07, // member_id = 7
            0x00, 0x06, b'b', b'r', b'o', b'k', b'e', b'r', // group = "broker"
        ];
        let mut source = Cursor::new(&frame[..]);
        let request: JoinRequest = decode_frame(&mut source, frame.len(), 0)?;
        println!("  decoded: {request:?}");
    }

    // Example 2: the same record at v1 grows a compact rack field
    println!("\n2. Version 1 frame:");
    {
        let frame = [
            0x00, 0x00, 0x00, 0x07, // member_id = 7
            0x00, 0x06, b'b', b'r', b'o', b'k', b'e', b'r', // group = "broker"
            0x0C, b'r', b'a', b'c', b'k', b'-', b'a', // rack = "rack-a" (varint len 6)
        ];
        let mut source = Cursor::new(&frame[..]);
        let request: JoinRequest = decode_frame(&mut source, frame.len(), 1)?;
        println!("  decoded: {request:?}");
    }

    // Example 3: a truncated frame fails but leaves the stream aligned
    println!("\n3. Truncated frame:");
    {
        let stream = [
            0x00, 0x00, 0x00, 0x07, 0x00, 0x06, b'b', // frame cut off at 7 bytes
            0xCA, 0xFE, // next frame's bytes, untouched by the failed decode
        ];
        let mut source = Cursor::new(&stream[..]);
        match decode_frame::<JoinRequest, _>(&mut source, 7, 0) {
            Ok(request) => println!("  unexpected success: {request:?}"),
            Err(err) => println!("  error: {err} (source at offset {})", source.position()),
        }
    }

    Ok(())
}
