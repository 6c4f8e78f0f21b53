//! Core PHP constants that commonly appear in default values.

use crate::value::PhpValue;

/// Value of a core PHP constant, when it is one we know.
pub fn constant(name: &str) -> Option<PhpValue> {
    use PhpValue::{Float, Int};

    Some(match name {
        "PHP_INT_MAX" => Int(i64::MAX),
        "PHP_INT_MIN" => Int(i64::MIN),
        "PHP_INT_SIZE" => Int(8),
        "PHP_FLOAT_EPSILON" => Float(f64::EPSILON),
        "PHP_FLOAT_MAX" => Float(f64::MAX),
        "PHP_FLOAT_MIN" => Float(f64::MIN_POSITIVE),
        "PHP_FLOAT_DIG" => Int(15),
        "PHP_EOL" => PhpValue::String("\n".to_string()),
        "DIRECTORY_SEPARATOR" => PhpValue::String("/".to_string()),
        "PATH_SEPARATOR" => PhpValue::String(":".to_string()),
        "M_PI" => Float(std::f64::consts::PI),
        "M_E" => Float(std::f64::consts::E),
        "INF" => Float(f64::INFINITY),
        "NAN" => Float(f64::NAN),
        "E_ERROR" => Int(1),
        "E_WARNING" => Int(2),
        "E_NOTICE" => Int(8),
        "E_USER_ERROR" => Int(256),
        "E_USER_WARNING" => Int(512),
        "E_USER_NOTICE" => Int(1024),
        "E_STRICT" => Int(2048),
        "E_DEPRECATED" => Int(8192),
        "E_USER_DEPRECATED" => Int(16384),
        "E_ALL" => Int(32767),
        "SORT_REGULAR" => Int(0),
        "SORT_NUMERIC" => Int(1),
        "SORT_STRING" => Int(2),
        "COUNT_NORMAL" => Int(0),
        "COUNT_RECURSIVE" => Int(1),
        "ENT_NOQUOTES" => Int(0),
        "ENT_HTML401" => Int(0),
        "ENT_COMPAT" => Int(2),
        "ENT_QUOTES" => Int(3),
        "ENT_SUBSTITUTE" => Int(8),
        "JSON_UNESCAPED_SLASHES" => Int(64),
        "JSON_PRETTY_PRINT" => Int(128),
        "JSON_UNESCAPED_UNICODE" => Int(256),
        "JSON_THROW_ON_ERROR" => Int(4_194_304),
        _ => return None,
    })
}
