use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};
use std::net::TcpStream;

/// Taille maximale d'un message reçu.
pub const MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;

/// Envoie un message : longueur (u32 little-endian) puis les octets UTF-8.
pub fn send_message<W: Write>(stream: &mut W, message: &str) -> io::Result<()> {
    let message_bytes = message.as_bytes();
    let size = u32::try_from(message_bytes.len()).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, "message longer than u32::MAX bytes")
    })?;
    stream.write_u32::<LittleEndian>(size)?;
    stream.write_all(message_bytes)?;
    stream.flush()
}

/// Reçoit un message encadré par sa longueur.
pub fn receive_message<R: Read>(stream: &mut R) -> io::Result<String> {
    let size = stream.read_u32::<LittleEndian>()?;
    if size > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Frame of {} bytes exceeds the {} byte limit", size, MAX_FRAME_LEN),
        ));
    }
    let mut buffer = vec![0; size as usize];
    stream.read_exact(&mut buffer)?;
    String::from_utf8(buffer).map_err(|e| {
        io::Error::new(io::ErrorKind::InvalidData, format!("Invalid data: {}", e))
    })
}

/// Connecte le client au serveur
pub fn connect_to_server(address: &str) -> io::Result<TcpStream> {
    TcpStream::connect(address)
}
