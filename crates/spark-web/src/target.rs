use std::collections::BTreeMap;

use js_sys::{Array, Object, Reflect};
use spark_engine::{Animatable, SparkError, Value};
use wasm_bindgen::{JsCast, JsValue};

/// Animation target backed by a plain JS object; properties are read and
/// written with `Reflect`.
pub struct JsTarget {
    object: Object,
}

impl JsTarget {
    pub fn new(object: Object) -> Self {
        Self { object }
    }

    pub fn object(&self) -> &Object {
        &self.object
    }
}

impl Animatable for JsTarget {
    fn get_property(&self, name: &str) -> Option<Value> {
        let value = Reflect::get(&self.object, &JsValue::from_str(name)).ok()?;
        js_to_value(&value)
    }

    fn set_property(&mut self, name: &str, value: Value) {
        let written = Reflect::set(&self.object, &JsValue::from_str(name), &value_to_js(&value));
        report_write(name, written);
    }
}

/// Log a failed property write. Returns whether the write landed.
fn report_write(name: &str, written: Result<bool, JsValue>) -> bool {
    match written {
        Ok(true) => true,
        Ok(false) => {
            log::warn!("property `{}` is not writable, value dropped", name);
            false
        }
        Err(err) => {
            log::warn!("writing property `{}` failed: {:?}", name, err);
            false
        }
    }
}

/// All-numeric items become a tuple; any other item makes the array
/// unsupported rather than shortening it.
fn numeric_tuple(items: impl IntoIterator<Item = Option<f64>>) -> Option<Value> {
    items
        .into_iter()
        .map(|n| n.map(|n| n as f32))
        .collect::<Option<Vec<_>>>()
        .map(Value::Tuple)
}

/// Numbers, strings, numeric arrays and flat objects. `undefined`, `null`,
/// mixed arrays and anything else yield `None`.
pub fn js_to_value(value: &JsValue) -> Option<Value> {
    if let Some(n) = value.as_f64() {
        return Some(Value::Number(n as f32));
    }
    if let Some(s) = value.as_string() {
        return Some(Value::Text(s));
    }
    if Array::is_array(value) {
        let array: &Array = value.unchecked_ref();
        return numeric_tuple(array.iter().map(|v| v.as_f64()));
    }
    let object = value.dyn_ref::<Object>()?;
    let mut record = BTreeMap::new();
    for entry in Object::entries(object).iter() {
        let pair: Array = entry.unchecked_into();
        if let (Some(key), Some(v)) = (pair.get(0).as_string(), js_to_value(&pair.get(1))) {
            record.insert(key, v);
        }
    }
    Some(Value::Record(record))
}

pub fn value_to_js(value: &Value) -> JsValue {
    match value {
        Value::Number(n) => JsValue::from_f64(*n as f64),
        Value::Text(s) => JsValue::from_str(s),
        Value::Tuple(items) => items
            .iter()
            .map(|n| JsValue::from_f64(*n as f64))
            .collect::<Array>()
            .into(),
        Value::Record(fields) => {
            let object = Object::new();
            for (key, v) in fields {
                let _ = Reflect::set(&object, &JsValue::from_str(key), &value_to_js(v));
            }
            object.into()
        }
    }
}

/// `(name, value)` pairs from an object's own enumerable properties.
/// Fails on the first value that cannot be animated.
pub fn properties_of(object: &Object) -> Result<Vec<(String, Value)>, SparkError> {
    Object::entries(object)
        .iter()
        .filter_map(|entry| {
            let pair: Array = entry.unchecked_into();
            let name = pair.get(0).as_string()?;
            Some(match js_to_value(&pair.get(1)) {
                Some(value) => Ok((name, value)),
                None => Err(SparkError::invalid(format!("property `{}` has no animatable value", name))),
            })
        })
        .collect()
}
