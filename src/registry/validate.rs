//! Load-time schema checks
//!
//! Every `defined` reference must name a type in the table, and no type may
//! reach itself through struct fields or enum payloads alone. Going through
//! `vec`, `option`, `coption` or `array` breaks a cycle.

use std::collections::HashMap;

use crate::error::SchemaError;
use crate::idl::{IdlDefinedFields, IdlType, IdlTypeDef, IdlTypeDefTy};

/// Check that every `defined` reference inside `ty` resolves
pub(crate) fn check_type_refs(
    ty: &IdlType,
    types: &HashMap<String, IdlTypeDef>,
    context: &str,
) -> Result<(), SchemaError> {
    match ty {
        IdlType::Primitive(_) => Ok(()),
        IdlType::Vec { vec: inner }
        | IdlType::Option { option: inner }
        | IdlType::COption { coption: inner } => check_type_refs(inner, types, context),
        IdlType::Array { array } => check_type_refs(&array.0, types, context),
        IdlType::Defined { defined } => {
            if types.contains_key(defined.name()) {
                Ok(())
            } else {
                Err(SchemaError::UnresolvedType {
                    name: defined.name().to_string(),
                    referenced_from: context.to_string(),
                })
            }
        }
    }
}

/// Check every field and variant payload of a type definition
pub(crate) fn check_typedef_refs(
    def: &IdlTypeDef,
    types: &HashMap<String, IdlTypeDef>,
) -> Result<(), SchemaError> {
    match &def.ty {
        IdlTypeDefTy::Struct { fields } => {
            check_fields(fields.as_ref(), types, &format!("type `{}`", def.name))
        }
        IdlTypeDefTy::Enum { variants } => variants.iter().try_for_each(|variant| {
            check_fields(
                variant.fields.as_ref(),
                types,
                &format!("variant `{}::{}`", def.name, variant.name),
            )
        }),
    }
}

fn check_fields(
    fields: Option<&IdlDefinedFields>,
    types: &HashMap<String, IdlTypeDef>,
    owner: &str,
) -> Result<(), SchemaError> {
    match fields {
        None => Ok(()),
        Some(IdlDefinedFields::Named(named)) => named.iter().try_for_each(|field| {
            check_type_refs(&field.ty, types, &format!("{} field `{}`", owner, field.name))
        }),
        Some(IdlDefinedFields::Tuple(tuple)) => {
            tuple.iter().enumerate().try_for_each(|(i, ty)| {
                check_type_refs(ty, types, &format!("{} field {}", owner, i))
            })
        }
    }
}

/// Names reached from `def` without passing through an indirection
fn direct_refs(def: &IdlTypeDef) -> Vec<&str> {
    fn collect<'a>(fields: Option<&'a IdlDefinedFields>, out: &mut Vec<&'a str>) {
        if let Some(fields) = fields {
            for ty in fields.types() {
                if let Some(name) = ty.defined_name() {
                    out.push(name);
                }
            }
        }
    }

    let mut out = Vec::new();
    match &def.ty {
        IdlTypeDefTy::Struct { fields } => collect(fields.as_ref(), &mut out),
        IdlTypeDefTy::Enum { variants } => {
            for variant in variants {
                collect(variant.fields.as_ref(), &mut out);
            }
        }
    }
    out
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Reject direct (non-indirected) reference cycles
///
/// `order` fixes the traversal order so the reported cycle is deterministic.
pub(crate) fn check_cycles(
    types: &HashMap<String, IdlTypeDef>,
    order: &[String],
) -> Result<(), SchemaError> {
    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut stack: Vec<&str> = Vec::new();

    for name in order {
        visit(name, types, &mut marks, &mut stack)?;
    }
    Ok(())
}

fn visit<'a>(
    name: &'a str,
    types: &'a HashMap<String, IdlTypeDef>,
    marks: &mut HashMap<&'a str, Mark>,
    stack: &mut Vec<&'a str>,
) -> Result<(), SchemaError> {
    match marks.get(name) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Visiting) => {
            let start = stack.iter().position(|n| *n == name).unwrap_or(0);
            let mut cycle: Vec<&str> = stack[start..].to_vec();
            cycle.push(name);
            return Err(SchemaError::SelfReference {
                name: name.to_string(),
                cycle: cycle.join(" -> "),
            });
        }
        None => {}
    }

    // Dangling names were already rejected by the reference check
    let Some(def) = types.get(name) else {
        return Ok(());
    };

    marks.insert(name, Mark::Visiting);
    stack.push(name);
    for next in direct_refs(def) {
        visit(next, types, marks, stack)?;
    }
    stack.pop();
    marks.insert(name, Mark::Done);
    Ok(())
}
