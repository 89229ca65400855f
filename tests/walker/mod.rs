//! Minimal class file reader, only good enough to check the framing of what the writer produces

#![allow(dead_code)]

use byteorder::{BigEndian, ReadBytesExt};
use std::collections::HashMap;
use std::io::{Cursor, Read};

pub struct WalkedAttribute {
    pub name: String,
    pub info: Vec<u8>,

    /// Attributes nested inside a `Code` attribute
    pub nested: Vec<WalkedAttribute>,
}

pub struct WalkedMember {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub attributes: Vec<WalkedAttribute>,
}

pub struct WalkedClass {
    pub minor_version: u16,
    pub major_version: u16,

    /// Count field of the pool, so one more than the largest usable index
    pub constant_pool_count: u16,
    pub access_flags: u16,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<WalkedMember>,
    pub methods: Vec<WalkedMember>,
    pub attributes: Vec<WalkedAttribute>,
}

struct Walker<'a> {
    cursor: Cursor<&'a [u8]>,

    /// Tag of the constant starting at each usable index
    tags: HashMap<u16, u8>,
    utf8s: HashMap<u16, String>,
    constant_pool_count: u16,
}

/// Walk a whole class file, panicking on anything malformed
///
/// Every index read is checked to be in the pool and to point at the start of a constant, and
/// every attribute length is checked to cover exactly the bytes of its body.
pub fn walk(bytes: &[u8]) -> WalkedClass {
    let mut walker = Walker {
        cursor: Cursor::new(bytes),
        tags: HashMap::new(),
        utf8s: HashMap::new(),
        constant_pool_count: 0,
    };

    assert_eq!(walker.u32(), 0xCAFEBABE, "bad magic");
    let minor_version = walker.u16();
    let major_version = walker.u16();
    walker.constant_pool();

    let access_flags = walker.u16();
    let this_class = walker.index_of(7);
    let super_class = walker.u16();
    if super_class != 0 {
        walker.check_index(super_class, 7);
    }
    let interfaces = (0..walker.u16()).map(|_| walker.index_of(7)).collect();
    let fields = walker.members();
    let methods = walker.members();
    let attributes = walker.attributes();

    let consumed = walker.cursor.position() as usize;
    assert_eq!(consumed, bytes.len(), "trailing bytes after the class");

    WalkedClass {
        minor_version,
        major_version,
        constant_pool_count: walker.constant_pool_count,
        access_flags,
        this_class,
        super_class,
        interfaces,
        fields,
        methods,
        attributes,
    }
}

impl<'a> Walker<'a> {
    fn u8(&mut self) -> u8 {
        self.cursor.read_u8().expect("unexpected end of class")
    }

    fn u16(&mut self) -> u16 {
        self.cursor
            .read_u16::<BigEndian>()
            .expect("unexpected end of class")
    }

    fn u32(&mut self) -> u32 {
        self.cursor
            .read_u32::<BigEndian>()
            .expect("unexpected end of class")
    }

    fn bytes(&mut self, len: usize) -> Vec<u8> {
        let mut buffer = vec![0; len];
        self.cursor
            .read_exact(&mut buffer)
            .expect("unexpected end of class");
        buffer
    }

    fn check_index(&self, index: u16, tag: u8) {
        assert!(
            index > 0 && index < self.constant_pool_count,
            "index {} outside of pool with count {}",
            index,
            self.constant_pool_count
        );
        assert_eq!(
            self.tags.get(&index),
            Some(&tag),
            "constant {} has the wrong tag",
            index
        );
    }

    fn index_of(&mut self, tag: u8) -> u16 {
        let index = self.u16();
        self.check_index(index, tag);
        index
    }

    fn utf8(&mut self) -> String {
        let index = self.index_of(1);
        self.utf8s[&index].clone()
    }

    fn constant_pool(&mut self) {
        self.constant_pool_count = self.u16();
        let mut index = 1;
        while index < self.constant_pool_count {
            let tag = self.u8();
            self.tags.insert(index, tag);
            let width = match tag {
                1 => {
                    let len = self.u16() as usize;
                    let utf8 = self.bytes(len);
                    self.utf8s
                        .insert(index, String::from_utf8_lossy(&utf8).into_owned());
                    1
                }
                3 | 4 => {
                    self.bytes(4);
                    1
                }
                5 | 6 => {
                    self.bytes(8);
                    2
                }
                7 | 8 | 16 | 19 | 20 => {
                    self.bytes(2);
                    1
                }
                9 | 10 | 11 | 12 | 17 | 18 => {
                    self.bytes(4);
                    1
                }
                15 => {
                    self.bytes(3);
                    1
                }
                other => panic!("unknown constant tag {} at index {}", other, index),
            };
            index += width;
        }
        assert_eq!(index, self.constant_pool_count, "wide constant overruns pool");
    }

    fn members(&mut self) -> Vec<WalkedMember> {
        (0..self.u16())
            .map(|_| WalkedMember {
                access_flags: self.u16(),
                name: self.utf8(),
                descriptor: self.utf8(),
                attributes: self.attributes(),
            })
            .collect()
    }

    fn attributes(&mut self) -> Vec<WalkedAttribute> {
        (0..self.u16()).map(|_| self.attribute()).collect()
    }

    fn attribute(&mut self) -> WalkedAttribute {
        let name = self.utf8();
        let len = self.u32() as usize;
        let info = self.bytes(len);

        let mut body = self.body_walker(&info);
        let nested = body.attribute_body(&name);
        assert_eq!(
            body.cursor.position() as usize,
            info.len(),
            "`{}` length disagrees with its contents",
            name
        );

        WalkedAttribute { name, info, nested }
    }

    /// Walker over the body of an attribute, sharing this walker's view of the pool
    fn body_walker<'b>(&self, info: &'b [u8]) -> Walker<'b> {
        Walker {
            cursor: Cursor::new(info),
            tags: self.tags.clone(),
            utf8s: self.utf8s.clone(),
            constant_pool_count: self.constant_pool_count,
        }
    }

    /// Any kind of constant, as long as the index lands on the start of one
    fn any_index(&mut self) -> u16 {
        let index = self.u16();
        assert!(
            self.tags.contains_key(&index),
            "index {} is not the start of a constant",
            index
        );
        index
    }

    fn optional_index_of(&mut self, tag: u8) -> u16 {
        let index = self.u16();
        if index != 0 {
            self.check_index(index, tag);
        }
        index
    }

    /// Check the indices inside the bodies this walker knows, and skip over the rest
    ///
    /// Returns the attributes nested inside `Code`.
    fn attribute_body(&mut self, name: &str) -> Vec<WalkedAttribute> {
        match name {
            "Code" => return self.code_body(),
            "SourceFile" | "SourceDir" | "Signature" => {
                self.index_of(1);
            }
            "NestHost" => {
                self.index_of(7);
            }
            "ConstantValue" => {
                self.any_index();
            }
            "Exceptions" | "NestMembers" => {
                for _ in 0..self.u16() {
                    self.index_of(7);
                }
            }
            "InnerClasses" => {
                for _ in 0..self.u16() {
                    self.index_of(7);
                    self.optional_index_of(7);
                    self.optional_index_of(1);
                    self.u16();
                }
            }
            "EnclosingMethod" => {
                self.index_of(7);
                self.optional_index_of(12);
            }
            "LineNumberTable" => {
                let lines = self.u16() as usize;
                self.bytes(lines * 4);
            }
            "LocalVariableTable" | "LocalVariableTypeTable" => {
                for _ in 0..self.u16() {
                    self.u16();
                    self.u16();
                    self.index_of(1);
                    self.index_of(1);
                    self.u16();
                }
            }
            "StackMapTable" => {
                for _ in 0..self.u16() {
                    self.stack_map_frame();
                }
            }
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                for _ in 0..self.u16() {
                    self.annotation();
                }
            }
            "AnnotationDefault" => self.element_value(),
            "BootstrapMethods" => {
                for _ in 0..self.u16() {
                    self.index_of(15);
                    for _ in 0..self.u16() {
                        self.any_index();
                    }
                }
            }
            _ => {
                let rest = self.cursor.get_ref().len() - self.cursor.position() as usize;
                self.bytes(rest);
            }
        }
        vec![]
    }

    fn code_body(&mut self) -> Vec<WalkedAttribute> {
        let _max_stack = self.u16();
        let _max_locals = self.u16();
        let code_len = self.u32() as usize;
        assert!(code_len > 0 && code_len <= 65535, "bad code length {}", code_len);
        self.bytes(code_len);
        for _ in 0..self.u16() {
            self.bytes(6);
            self.optional_index_of(7);
        }
        self.attributes()
    }

    fn verification_type(&mut self) {
        match self.u8() {
            0..=6 => (),
            7 => {
                self.index_of(7);
            }
            8 => {
                self.u16();
            }
            other => panic!("unknown verification type {}", other),
        }
    }

    fn verification_types(&mut self) {
        for _ in 0..self.u16() {
            self.verification_type();
        }
    }

    fn stack_map_frame(&mut self) {
        match self.u8() {
            0..=63 => (),
            64..=127 => self.verification_type(),
            247 => {
                self.u16();
                self.verification_type();
            }
            248..=251 => {
                self.u16();
            }
            tag @ 252..=254 => {
                self.u16();
                for _ in 252..=tag {
                    self.verification_type();
                }
            }
            255 => {
                self.u16();
                self.verification_types();
                self.verification_types();
            }
            other => panic!("reserved stack map frame tag {}", other),
        }
    }

    fn annotation(&mut self) {
        self.index_of(1);
        for _ in 0..self.u16() {
            self.index_of(1);
            self.element_value();
        }
    }

    fn element_value(&mut self) {
        match self.u8() {
            b'B' | b'C' | b'I' | b'S' | b'Z' => {
                self.index_of(3);
            }
            b'D' => {
                self.index_of(6);
            }
            b'F' => {
                self.index_of(4);
            }
            b'J' => {
                self.index_of(5);
            }
            b's' | b'c' => {
                self.index_of(1);
            }
            b'e' => {
                self.index_of(1);
                self.index_of(1);
            }
            b'@' => self.annotation(),
            b'[' => {
                for _ in 0..self.u16() {
                    self.element_value();
                }
            }
            other => panic!("unknown element value tag {}", other),
        }
    }
}
