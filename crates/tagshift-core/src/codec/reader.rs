use std::io::Read;

use crate::error::{Result, TagError};
use crate::tag::{Compound, TagList, TagType, TagValue};

/// Upper bound on speculative allocation from an untrusted length prefix.
const PREALLOCATE_LIMIT: usize = 4096;

pub(crate) fn read_root<R: Read>(r: &mut R, max_depth: usize) -> Result<(String, TagValue)> {
    let ty = read_type(r)?;
    let name = read_string(r)?;
    let value = read_payload(r, ty, 0, max_depth)?;
    Ok((name, value))
}

fn read_type<R: Read>(r: &mut R) -> Result<TagType> {
    let id = read_u8(r)?;
    TagType::from_id(id).ok_or(TagError::UnknownTagType(id))
}

fn read_payload<R: Read>(
    r: &mut R,
    ty: TagType,
    depth: usize,
    max_depth: usize,
) -> Result<TagValue> {
    Ok(match ty {
        TagType::Byte => TagValue::Byte(i8::from_be_bytes(read_array(r)?)),
        TagType::Short => TagValue::Short(i16::from_be_bytes(read_array(r)?)),
        TagType::Int => TagValue::Int(i32::from_be_bytes(read_array(r)?)),
        TagType::Long => TagValue::Long(i64::from_be_bytes(read_array(r)?)),
        TagType::Float => TagValue::Float(f32::from_be_bytes(read_array(r)?)),
        TagType::Double => TagValue::Double(f64::from_be_bytes(read_array(r)?)),
        TagType::String => TagValue::String(read_string(r)?),
        TagType::ByteArray => {
            let length = read_length(r, "byte array")?;
            let bytes = read_exact_vec(r, length)?;
            TagValue::ByteArray(bytes.into_iter().map(|b| b as i8).collect())
        }
        TagType::IntArray => {
            let length = read_length(r, "int array")?;
            let mut values = Vec::with_capacity(length.min(PREALLOCATE_LIMIT));
            for _ in 0..length {
                values.push(i32::from_be_bytes(read_array(r)?));
            }
            TagValue::IntArray(values)
        }
        TagType::LongArray => {
            let length = read_length(r, "long array")?;
            let mut values = Vec::with_capacity(length.min(PREALLOCATE_LIMIT));
            for _ in 0..length {
                values.push(i64::from_be_bytes(read_array(r)?));
            }
            TagValue::LongArray(values)
        }
        TagType::List => {
            let depth = enter(depth, max_depth)?;
            let element_id = read_u8(r)?;
            let count = read_length(r, "list")?;
            if element_id == 0 {
                if count != 0 {
                    return Err(TagError::UnknownTagType(0));
                }
                return Ok(TagValue::List(TagList::new()));
            }
            let element = TagType::from_id(element_id).ok_or(TagError::UnknownTagType(element_id))?;
            let mut list = TagList::typed(element);
            for _ in 0..count {
                list.push(read_payload(r, element, depth, max_depth)?);
            }
            TagValue::List(list)
        }
        TagType::Compound => {
            let depth = enter(depth, max_depth)?;
            let mut map = Compound::new();
            loop {
                let id = read_u8(r)?;
                if id == 0 {
                    break;
                }
                let ty = TagType::from_id(id).ok_or(TagError::UnknownTagType(id))?;
                let key = read_string(r)?;
                let value = read_payload(r, ty, depth, max_depth)?;
                map.insert(key, value);
            }
            TagValue::Compound(map)
        }
    })
}

fn enter(depth: usize, max_depth: usize) -> Result<usize> {
    if depth >= max_depth {
        return Err(TagError::DepthLimitExceeded(max_depth));
    }
    Ok(depth + 1)
}

fn read_u8<R: Read>(r: &mut R) -> Result<u8> {
    Ok(read_array::<R, 1>(r)?[0])
}

fn read_array<R: Read, const N: usize>(r: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_length<R: Read>(r: &mut R, what: &'static str) -> Result<usize> {
    let length = i32::from_be_bytes(read_array(r)?);
    usize::try_from(length).map_err(|_| TagError::InvalidLength {
        what,
        length: i64::from(length),
    })
}

fn read_string<R: Read>(r: &mut R) -> Result<String> {
    let length = u16::from_be_bytes(read_array(r)?);
    let bytes = read_exact_vec(r, usize::from(length))?;
    Ok(String::from_utf8(bytes)?)
}

fn read_exact_vec<R: Read>(r: &mut R, length: usize) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(length.min(PREALLOCATE_LIMIT));
    r.take(length as u64).read_to_end(&mut bytes)?;
    if bytes.len() != length {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }
    Ok(bytes)
}
