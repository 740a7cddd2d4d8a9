use std::io::Write;

use crate::error::{Result, TagError};
use crate::tag::{Compound, TagList, TagValue};

pub(crate) fn write_root<W: Write>(w: &mut W, name: &str, tree: &TagValue) -> Result<()> {
    w.write_all(&[tree.type_id()])?;
    write_string(w, name)?;
    write_payload(w, tree)
}

fn write_payload<W: Write>(w: &mut W, tag: &TagValue) -> Result<()> {
    match tag {
        TagValue::Byte(v) => w.write_all(&v.to_be_bytes())?,
        TagValue::Short(v) => w.write_all(&v.to_be_bytes())?,
        TagValue::Int(v) => w.write_all(&v.to_be_bytes())?,
        TagValue::Long(v) => w.write_all(&v.to_be_bytes())?,
        TagValue::Float(v) => w.write_all(&v.to_be_bytes())?,
        TagValue::Double(v) => w.write_all(&v.to_be_bytes())?,
        TagValue::String(s) => write_string(w, s)?,
        TagValue::ByteArray(values) => {
            write_length(w, values.len(), "byte array")?;
            let bytes: Vec<u8> = values.iter().map(|v| *v as u8).collect();
            w.write_all(&bytes)?;
        }
        TagValue::IntArray(values) => {
            write_length(w, values.len(), "int array")?;
            for v in values {
                w.write_all(&v.to_be_bytes())?;
            }
        }
        TagValue::LongArray(values) => {
            write_length(w, values.len(), "long array")?;
            for v in values {
                w.write_all(&v.to_be_bytes())?;
            }
        }
        TagValue::List(list) => write_list(w, list)?,
        TagValue::Compound(map) => write_compound(w, map)?,
    }
    Ok(())
}

fn write_list<W: Write>(w: &mut W, list: &TagList) -> Result<()> {
    let element = list.element_type().map(|ty| ty.id()).unwrap_or(0);
    w.write_all(&[element])?;
    write_length(w, list.len(), "list")?;
    for item in list {
        write_payload(w, item)?;
    }
    Ok(())
}

fn write_compound<W: Write>(w: &mut W, map: &Compound) -> Result<()> {
    for (key, value) in map {
        w.write_all(&[value.type_id()])?;
        write_string(w, key)?;
        write_payload(w, value)?;
    }
    w.write_all(&[0])?;
    Ok(())
}

fn write_string<W: Write>(w: &mut W, s: &str) -> Result<()> {
    let length = u16::try_from(s.len()).map_err(|_| TagError::InvalidLength {
        what: "string",
        length: s.len() as i64,
    })?;
    w.write_all(&length.to_be_bytes())?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

fn write_length<W: Write>(w: &mut W, length: usize, what: &'static str) -> Result<()> {
    let length = i32::try_from(length).map_err(|_| TagError::InvalidLength {
        what,
        length: length as i64,
    })?;
    w.write_all(&length.to_be_bytes())?;
    Ok(())
}
