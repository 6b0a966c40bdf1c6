//! Native functions installed into every new interpreter.

use std::time::{SystemTime, SystemTimeError, UNIX_EPOCH};

use log::{debug, info};

use crate::callable::NativeFunction;
use crate::interpreter::Interpreter;
use crate::value::Value;

/// `clock`, `print` and `println`, ready for [`Interpreter::install`].
pub fn standard() -> Vec<NativeFunction> {
    vec![
        NativeFunction::new("clock", 0, clock),
        NativeFunction::new("print", 1, print),
        NativeFunction::new("println", 1, println),
    ]
}

/// Seconds since the Unix epoch.
fn clock<'a>(_interpreter: &mut Interpreter<'a>, _args: &[Value<'a>]) -> Result<Value<'a>, String> {
    let timestamp: f64 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e: SystemTimeError| format!("Clock error: {}", e))?
        .as_secs_f64();

    info!("Native function 'clock' returned: {}", timestamp);

    Ok(Value::Number(timestamp))
}

fn print<'a>(interpreter: &mut Interpreter<'a>, args: &[Value<'a>]) -> Result<Value<'a>, String> {
    debug!("print: {}", args[0]);

    write!(interpreter.output(), "{}", args[0]).map_err(|e| format!("Output error: {}", e))?;

    Ok(Value::Nil)
}

fn println<'a>(interpreter: &mut Interpreter<'a>, args: &[Value<'a>]) -> Result<Value<'a>, String> {
    debug!("println: {}", args[0]);

    writeln!(interpreter.output(), "{}", args[0]).map_err(|e| format!("Output error: {}", e))?;

    Ok(Value::Nil)
}
