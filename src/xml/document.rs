// 流式读取 XML，构造轻量的元素树

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{BufReader, Read};

use crate::beans::BeansError;

/// 元素节点，名称和属性名均去掉命名空间前缀
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// 按 XML 读取文档的根元素
    ///
    /// `description` 用于错误信息
    pub fn parse<R: Read>(read: R, description: &str) -> Result<Element, BeansError> {
        let mut reader = Reader::from_reader(BufReader::new(read));
        reader.trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut buf = Vec::new();

        loop {
            let event = reader.read_event_into(&mut buf).map_err(|e| {
                BeansError::parse(
                    description,
                    format!("malformed XML at position {}: {}", reader.buffer_position(), e),
                )
            })?;

            match event {
                Event::Start(start) => {
                    stack.push(start_element(&start, description)?);
                }
                Event::Empty(start) => {
                    let element = start_element(&start, description)?;
                    attach(element, &mut stack, &mut root, description)?;
                }
                Event::End(_) => {
                    // 标签名是否匹配由 quick-xml 检查
                    let Some(element) = stack.pop() else {
                        return Err(BeansError::parse(description, "unexpected closing tag"));
                    };
                    attach(element, &mut stack, &mut root, description)?;
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| BeansError::parse(description, e))?;
                    append_text(&mut stack, &text);
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data.into_inner()).to_string();
                    append_text(&mut stack, &text);
                }
                Event::Eof => break,
                // 声明、注释、处理指令、DOCTYPE
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(BeansError::parse(
                description,
                format!("unexpected end of document, element <{}> is not closed", open.name),
            ));
        }
        root.ok_or_else(|| BeansError::parse(description, "document has no root element"))
    }
}

fn start_element(start: &BytesStart, description: &str) -> Result<Element, BeansError> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).to_string();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| BeansError::parse(description, e))?;
        let key = attribute.key;
        // 命名空间声明和带前缀的属性（如 xsi:schemaLocation）不参与解析
        if key.as_ref() == b"xmlns" || key.prefix().is_some() {
            continue;
        }
        let value = attribute
            .unescape_value()
            .map_err(|e| BeansError::parse(description, e))?;
        attributes.push((
            String::from_utf8_lossy(key.local_name().as_ref()).to_string(),
            value.to_string(),
        ));
    }
    Ok(Element {
        name,
        attributes,
        ..Default::default()
    })
}

fn attach(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
    description: &str,
) -> Result<(), BeansError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(BeansError::parse(description, "document has more than one root element"));
    }
    *root = Some(element);
    Ok(())
}

fn append_text(stack: &mut [Element], text: &str) {
    if let Some(current) = stack.last_mut() {
        current.text.push_str(text);
    }
}
