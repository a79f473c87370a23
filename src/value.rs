//! Write handles into destination records
//!
//! A [`Value`] is a typed, mutable slot inside a record being decoded: the
//! record root itself, one of its fields, or one element of an array. The
//! plan executor walks from the root to each destination through
//! [`Value::field_mut`] / [`Value::index_mut`] and writes through the setter
//! matching the field's declared kind. Handles borrow the record; they never
//! outlive the decode call that created them.

use std::io::{self, Read};

/// A record type that reads itself directly from the raw byte source,
/// bypassing field-by-field decoding.
///
/// This is the escape hatch for layouts the flat field model cannot express
/// (internally length-prefixed substructure, packed batches). The
/// implementation gets the source itself, not the budget-bounded reader, so
/// it must consume exactly the bytes that belong to it and report the count
/// back; the frame budget is debited with the returned value.
pub trait SelfDecodable {
    /// Read the record from `source`, returning how many bytes were consumed.
    fn read_from(&mut self, source: &mut dyn Read) -> io::Result<usize>;
}

/// Mutable, typed access to one decode destination.
///
/// A plan only invokes the accessor matching a field's declared kind, so
/// implementations override exactly the methods their shape supports. The
/// defaults panic: reaching one means a descriptor disagrees with its record
/// type, which is a catalog-authoring bug, not a wire condition.
pub trait Value {
    /// Store a boolean.
    fn set_bool(&mut self, _value: bool) {
        reject("bool")
    }

    /// Store a signed 8-bit integer.
    fn set_i8(&mut self, _value: i8) {
        reject("int8")
    }

    /// Store a signed 16-bit integer.
    fn set_i16(&mut self, _value: i16) {
        reject("int16")
    }

    /// Store a signed 32-bit integer.
    fn set_i32(&mut self, _value: i32) {
        reject("int32")
    }

    /// Store a signed 64-bit integer.
    fn set_i64(&mut self, _value: i64) {
        reject("int64")
    }

    /// Store a string.
    fn set_string(&mut self, _value: String) {
        reject("string")
    }

    /// Store a byte array; `None` means absent on the wire.
    fn set_bytes(&mut self, _value: Option<Vec<u8>>) {
        reject("bytes")
    }

    /// Resize to `len` default-valued elements before element decode begins.
    fn init_array(&mut self, _len: usize) {
        reject("array")
    }

    /// Handle to the `index`-th array element.
    fn index_mut(&mut self, _index: usize) -> &mut dyn Value {
        reject("array element")
    }

    /// Handle to the `index`-th field, in descriptor order.
    fn field_mut(&mut self, _index: usize) -> &mut dyn Value {
        reject("nested field")
    }

    /// The self-decoding capability, for types that declare it.
    fn as_self_decodable(&mut self) -> Option<&mut dyn SelfDecodable> {
        None
    }
}

fn reject(what: &str) -> ! {
    panic!("destination does not accept {what} writes: descriptor and record type disagree")
}

impl Value for bool {
    fn set_bool(&mut self, value: bool) {
        *self = value;
    }
}

impl Value for i8 {
    fn set_i8(&mut self, value: i8) {
        *self = value;
    }
}

impl Value for i16 {
    fn set_i16(&mut self, value: i16) {
        *self = value;
    }
}

impl Value for i32 {
    fn set_i32(&mut self, value: i32) {
        *self = value;
    }
}

impl Value for i64 {
    fn set_i64(&mut self, value: i64) {
        *self = value;
    }
}

impl Value for String {
    fn set_string(&mut self, value: String) {
        *self = value;
    }
}

impl Value for Option<Vec<u8>> {
    fn set_bytes(&mut self, value: Option<Vec<u8>>) {
        *self = value;
    }
}

impl<T: Value + Default> Value for Vec<T> {
    fn init_array(&mut self, len: usize) {
        self.clear();
        self.resize_with(len, T::default);
    }

    fn index_mut(&mut self, index: usize) -> &mut dyn Value {
        &mut self[index]
    }
}
