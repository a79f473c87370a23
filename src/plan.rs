//! Compiled decode plans
//!
//! A [`Plan`] is the ordered list of field decode operations for one
//! (record type, protocol version) pair. Plans are compiled lazily from the
//! record's descriptor, published immutable, and cached for the process
//! lifetime, so repeated decodes of the same message kind at the same
//! negotiated version never re-walk the schema. Version selection happens
//! entirely at compile time: a field whose tags do not cover the requested
//! version is simply not in the plan.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::debug;

use crate::decoder::Decoder;
use crate::error::{Error, Result};
use crate::schema::{Encoding, FieldKind, Record, RecordDescriptor, VersionTag};
use crate::source::ByteSource;
use crate::value::Value;

/// One resolved decode operation.
enum Op {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    String(Encoding),
    Bytes(Encoding),
    Record(Arc<Plan>),
    Array(Box<Op>),
}

/// An operation bound to its destination field index.
struct FieldOp {
    field: usize,
    op: Op,
}

enum Body {
    Fields(Vec<FieldOp>),
    SelfDecoding,
}

/// The compiled, immutable decode plan for one (record type, version) pair.
pub struct Plan {
    record: &'static str,
    version: i16,
    body: Body,
}

impl Plan {
    /// Name of the record type this plan decodes.
    pub fn record(&self) -> &'static str {
        self.record
    }

    /// Protocol version this plan was compiled for.
    pub fn version(&self) -> i16 {
        self.version
    }

    /// Number of fields selected into the plan at this version.
    ///
    /// Zero for self-decoding types, which bypass the field list.
    pub fn field_count(&self) -> usize {
        match &self.body {
            Body::Fields(fields) => fields.len(),
            Body::SelfDecoding => 0,
        }
    }

    /// Execute the plan against `dst`, pulling bytes from `decoder`.
    ///
    /// Failures are recorded on the decoder's sticky error; fields after the
    /// first failure are left at their defaults.
    pub fn run<S: ByteSource>(&self, decoder: &mut Decoder<'_, S>, dst: &mut dyn Value) {
        match &self.body {
            Body::Fields(fields) => {
                for step in fields {
                    step.op.apply(decoder, dst.field_mut(step.field));
                }
            }
            Body::SelfDecoding => self.run_self_decoding(decoder, dst),
        }
    }

    fn run_self_decoding<S: ByteSource>(&self, decoder: &mut Decoder<'_, S>, dst: &mut dyn Value) {
        if decoder.error().is_some() {
            return;
        }
        let Some(target) = dst.as_self_decodable() else {
            panic!(
                "{} declares self-decoding but exposes no self-decoder",
                self.record
            );
        };
        match target.read_from(decoder.source_mut()) {
            Ok(consumed) => decoder.consume(consumed),
            Err(err) => decoder.set_error(Error::Io(err)),
        }
    }
}

impl Op {
    fn resolve(kind: &FieldKind, version: i16, tag: &VersionTag) -> Op {
        match kind {
            FieldKind::Bool => Op::Bool,
            FieldKind::Int8 => Op::Int8,
            FieldKind::Int16 => Op::Int16,
            FieldKind::Int32 => Op::Int32,
            FieldKind::Int64 => Op::Int64,
            FieldKind::String => Op::String(tag.encoding),
            FieldKind::Bytes => Op::Bytes(tag.encoding),
            FieldKind::Record(nested) => Op::Record(plan_for(*nested, version)),
            FieldKind::Array(elem) => Op::Array(Box::new(Op::resolve(*elem, version, tag))),
        }
    }

    fn apply<S: ByteSource>(&self, decoder: &mut Decoder<'_, S>, dst: &mut dyn Value) {
        match self {
            Op::Bool => dst.set_bool(decoder.read_bool()),
            Op::Int8 => dst.set_i8(decoder.read_i8()),
            Op::Int16 => dst.set_i16(decoder.read_i16()),
            Op::Int32 => dst.set_i32(decoder.read_i32()),
            Op::Int64 => dst.set_i64(decoder.read_i64()),
            Op::String(Encoding::Fixed) => dst.set_string(decoder.read_string()),
            Op::String(Encoding::Compact) => dst.set_string(decoder.read_compact_string()),
            Op::Bytes(Encoding::Fixed) => dst.set_bytes(decoder.read_bytes()),
            Op::Bytes(Encoding::Compact) => dst.set_bytes(decoder.read_compact_bytes()),
            Op::Record(plan) => plan.run(decoder, dst),
            Op::Array(elem) => Self::apply_array(elem, decoder, dst),
        }
    }

    /// Count-prefixed array decode.
    ///
    /// The declared count sizes the destination, but element decode stops as
    /// soon as the frame budget runs dry, so a corrupt count cannot demand
    /// more work than the frame itself holds. Trailing elements keep their
    /// defaults; running out of budget between elements is not itself an
    /// error.
    fn apply_array<S: ByteSource>(elem: &Op, decoder: &mut Decoder<'_, S>, dst: &mut dyn Value) {
        let count = decoder.read_i32();
        if count < 0 {
            dst.init_array(0);
            return;
        }
        let count = count as usize;
        dst.init_array(count);
        for index in 0..count {
            if decoder.remaining() == 0 {
                break;
            }
            elem.apply(decoder, dst.index_mut(index));
        }
    }
}

fn compile(desc: &'static RecordDescriptor, version: i16) -> Plan {
    let body = if desc.self_decoding {
        Body::SelfDecoding
    } else {
        let mut fields = Vec::new();
        for (index, field) in desc.fields.iter().enumerate() {
            // First matching interval wins; absent fields stay out of the plan.
            let Some(tag) = field.tags.iter().find(|tag| tag.contains(version)) else {
                continue;
            };
            fields.push(FieldOp {
                field: index,
                op: Op::resolve(&field.kind, version, tag),
            });
        }
        Body::Fields(fields)
    };

    let plan = Plan {
        record: desc.name,
        version,
        body,
    };
    debug!(
        record = plan.record,
        version = plan.version,
        fields = plan.field_count(),
        "compiled decode plan"
    );
    plan
}

type PlanCache = RwLock<HashMap<(usize, i16), Arc<Plan>>>;

static PLAN_CACHE: OnceLock<PlanCache> = OnceLock::new();

/// Fetch the decode plan for `desc` at `version`, compiling on first use.
///
/// The cache is keyed by descriptor address and version. Concurrent first
/// use may compile the same plan twice; the first insert wins and every
/// caller shares the published copy from then on.
pub fn plan_for(desc: &'static RecordDescriptor, version: i16) -> Arc<Plan> {
    let key = (desc as *const RecordDescriptor as usize, version);
    let cache = PLAN_CACHE.get_or_init(|| RwLock::new(HashMap::new()));

    if let Some(plan) = cache
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Arc::clone(plan);
    }

    let plan = Arc::new(compile(desc, version));
    let mut map = cache.write().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(map.entry(key).or_insert(plan))
}

/// Decode one frame of `len` bytes from `source` into a fresh `T`.
///
/// The source is left positioned at the start of the next frame whether the
/// decode succeeds or fails.
pub fn decode_frame<T, S>(source: &mut S, len: usize, version: i16) -> Result<T>
where
    T: Record,
    S: ByteSource,
{
    let mut record = T::default();
    decode_frame_into(source, len, version, &mut record)?;
    Ok(record)
}

/// Decode one frame into a caller-provided record.
///
/// On error the record is left partially populated: fields decoded before
/// the failure hold their values, everything after stays at defaults. The
/// caller owns the judgment of whether a partial record is usable.
pub fn decode_frame_into<T, S>(source: &mut S, len: usize, version: i16, record: &mut T) -> Result<()>
where
    T: Record,
    S: ByteSource,
{
    let plan = plan_for(T::descriptor(), version);
    let mut decoder = Decoder::new(source, len);
    plan.run(&mut decoder, record);
    decoder.finish()
}
