//! Builds synthetic class files for tests.
//!
//! Only depends on `std`, so integration tests can include it with `#[path]`.
#![allow(dead_code)]

use std::collections::HashMap;

const CP_UTF8: u8 = 1;
const CP_INTEGER: u8 = 3;
const CP_LONG: u8 = 5;
const CP_CLASS: u8 = 7;

#[derive(Debug, Clone)]
pub enum Value {
    Int(i32),
    Boolean(bool),
    Str(String),
    /// Enum type name (dotted) and constant name.
    Enum(String, String),
    /// Class descriptor, such as `Ljava/lang/String;`.
    Class(String),
    Nested(Annotation),
    Array(Vec<Value>),
    /// A tag followed by arbitrary bytes.
    Raw(u8, Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct Annotation {
    type_name: String,
    values: Vec<(String, Value)>,
}

impl Annotation {
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            values: Vec::new(),
        }
    }

    pub fn value(mut self, name: &str, value: Value) -> Self {
        self.values.push((name.to_string(), value));
        self
    }
}

#[derive(Debug, Clone)]
pub enum Attribute {
    Annotations {
        visible: bool,
        annotations: Vec<Annotation>,
    },
    Raw {
        name: String,
        bytes: Vec<u8>,
    },
}

impl Attribute {
    pub fn visible(annotations: Vec<Annotation>) -> Self {
        Attribute::Annotations {
            visible: true,
            annotations,
        }
    }

    pub fn invisible(annotations: Vec<Annotation>) -> Self {
        Attribute::Annotations {
            visible: false,
            annotations,
        }
    }

    pub fn raw(name: &str, bytes: Vec<u8>) -> Self {
        Attribute::Raw {
            name: name.to_string(),
            bytes,
        }
    }
}

#[derive(Debug, Clone)]
struct Member {
    name: String,
    descriptor: String,
    attributes: Vec<Attribute>,
}

#[derive(Debug, Clone)]
pub struct ClassBuilder {
    magic: u32,
    pool: Vec<u8>,
    next_index: u16,
    utf8: HashMap<String, u16>,
    this_class: String,
    super_class: String,
    interfaces: Vec<String>,
    fields: Vec<Member>,
    methods: Vec<Member>,
    class_attributes: Vec<Attribute>,
}

impl ClassBuilder {
    /// Starts a class with the given dotted name.
    pub fn new(class_name: &str) -> Self {
        Self {
            magic: 0xCAFEBABE,
            pool: Vec::new(),
            next_index: 1,
            utf8: HashMap::new(),
            this_class: class_name.replace('.', "/"),
            super_class: "java/lang/Object".to_string(),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            class_attributes: Vec::new(),
        }
    }

    pub fn magic(&mut self, magic: u32) -> &mut Self {
        self.magic = magic;
        self
    }

    pub fn interface(&mut self, class_name: &str) -> &mut Self {
        self.interfaces.push(class_name.replace('.', "/"));
        self
    }

    pub fn field(&mut self, name: &str, descriptor: &str, attributes: Vec<Attribute>) -> &mut Self {
        self.fields.push(Member {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            attributes,
        });
        self
    }

    pub fn method(&mut self, name: &str, descriptor: &str, attributes: Vec<Attribute>) -> &mut Self {
        self.methods.push(Member {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            attributes,
        });
        self
    }

    pub fn class_attributes(&mut self, attributes: Vec<Attribute>) -> &mut Self {
        self.class_attributes.extend(attributes);
        self
    }

    pub fn utf8(&mut self, text: &str) -> u16 {
        if let Some(index) = self.utf8.get(text) {
            return *index;
        }
        self.pool.push(CP_UTF8);
        put_u16(&mut self.pool, text.len() as u16);
        self.pool.extend_from_slice(text.as_bytes());
        let index = self.claim(1);
        self.utf8.insert(text.to_string(), index);
        index
    }

    pub fn class_ref(&mut self, internal_name: &str) -> u16 {
        let name = self.utf8(internal_name);
        self.pool.push(CP_CLASS);
        put_u16(&mut self.pool, name);
        self.claim(1)
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        self.pool.push(CP_INTEGER);
        self.pool.extend_from_slice(&value.to_be_bytes());
        self.claim(1)
    }

    /// Adds a long constant, which occupies two slots.
    pub fn long(&mut self, value: i64) -> u16 {
        self.pool.push(CP_LONG);
        self.pool.extend_from_slice(&value.to_be_bytes());
        self.claim(2)
    }

    /// Adds an arbitrary constant entry occupying `slots` slots.
    pub fn raw_constant(&mut self, tag: u8, bytes: &[u8], slots: u16) -> u16 {
        self.pool.push(tag);
        self.pool.extend_from_slice(bytes);
        self.claim(slots)
    }

    pub fn build(mut self) -> Vec<u8> {
        let this_name = self.this_class.clone();
        let this_class = self.class_ref(&this_name);
        let super_name = self.super_class.clone();
        let super_class = self.class_ref(&super_name);
        let interface_names = std::mem::take(&mut self.interfaces);
        let interfaces: Vec<u16> = interface_names
            .iter()
            .map(|name| self.class_ref(name))
            .collect();

        let mut body = Vec::new();
        put_u16(&mut body, 0x0021);
        put_u16(&mut body, this_class);
        put_u16(&mut body, super_class);
        put_u16(&mut body, interfaces.len() as u16);
        for index in interfaces {
            put_u16(&mut body, index);
        }
        for members in [std::mem::take(&mut self.fields), std::mem::take(&mut self.methods)] {
            put_u16(&mut body, members.len() as u16);
            for member in members {
                put_u16(&mut body, 0x0001);
                let name = self.utf8(&member.name);
                put_u16(&mut body, name);
                let descriptor = self.utf8(&member.descriptor);
                put_u16(&mut body, descriptor);
                let attributes = self.encode_attributes(&member.attributes);
                body.extend_from_slice(&attributes);
            }
        }
        let class_attributes = std::mem::take(&mut self.class_attributes);
        let attributes = self.encode_attributes(&class_attributes);
        body.extend_from_slice(&attributes);

        let mut out = Vec::new();
        out.extend_from_slice(&self.magic.to_be_bytes());
        put_u16(&mut out, 0);
        put_u16(&mut out, 52);
        put_u16(&mut out, self.next_index);
        out.extend_from_slice(&self.pool);
        out.extend_from_slice(&body);
        out
    }

    fn claim(&mut self, slots: u16) -> u16 {
        let index = self.next_index;
        self.next_index += slots;
        index
    }

    fn encode_attributes(&mut self, attributes: &[Attribute]) -> Vec<u8> {
        let mut out = Vec::new();
        put_u16(&mut out, attributes.len() as u16);
        for attribute in attributes {
            let (name, body) = match attribute {
                Attribute::Annotations {
                    visible,
                    annotations,
                } => {
                    let name = if *visible {
                        "RuntimeVisibleAnnotations"
                    } else {
                        "RuntimeInvisibleAnnotations"
                    };
                    let mut body = Vec::new();
                    put_u16(&mut body, annotations.len() as u16);
                    for annotation in annotations {
                        self.encode_annotation(annotation, &mut body);
                    }
                    (name.to_string(), body)
                }
                Attribute::Raw { name, bytes } => (name.clone(), bytes.clone()),
            };
            let name = self.utf8(&name);
            put_u16(&mut out, name);
            out.extend_from_slice(&(body.len() as u32).to_be_bytes());
            out.extend_from_slice(&body);
        }
        out
    }

    fn encode_annotation(&mut self, annotation: &Annotation, out: &mut Vec<u8>) {
        let type_name = descriptor(&annotation.type_name);
        let index = self.utf8(&type_name);
        put_u16(out, index);
        put_u16(out, annotation.values.len() as u16);
        for (name, value) in &annotation.values {
            let index = self.utf8(name);
            put_u16(out, index);
            self.encode_value(value, out);
        }
    }

    fn encode_value(&mut self, value: &Value, out: &mut Vec<u8>) {
        match value {
            Value::Int(v) => {
                out.push(b'I');
                let index = self.integer(*v);
                put_u16(out, index);
            }
            Value::Boolean(v) => {
                out.push(b'Z');
                let index = self.integer(i32::from(*v));
                put_u16(out, index);
            }
            Value::Str(s) => {
                out.push(b's');
                let index = self.utf8(s);
                put_u16(out, index);
            }
            Value::Enum(type_name, constant) => {
                out.push(b'e');
                let type_index = self.utf8(&descriptor(type_name));
                put_u16(out, type_index);
                let constant_index = self.utf8(constant);
                put_u16(out, constant_index);
            }
            Value::Class(class_descriptor) => {
                out.push(b'c');
                let index = self.utf8(class_descriptor);
                put_u16(out, index);
            }
            Value::Nested(annotation) => {
                out.push(b'@');
                self.encode_annotation(annotation, out);
            }
            Value::Array(values) => {
                out.push(b'[');
                put_u16(out, values.len() as u16);
                for value in values {
                    self.encode_value(value, out);
                }
            }
            Value::Raw(tag, bytes) => {
                out.push(*tag);
                out.extend_from_slice(bytes);
            }
        }
    }
}

fn descriptor(class_name: &str) -> String {
    format!("L{};", class_name.replace('.', "/"))
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}
