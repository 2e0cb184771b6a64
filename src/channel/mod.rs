use std::collections::VecDeque;

pub trait Message: Clone + Default + 'static{}

//blanket impl for all types that meet constraints
impl<T: Clone + Default + 'static> Message for T{}

//named bounded FIFO channel with per-publish epochs
//single dispatcher owns every channel, so no atomics needed here;
//overflow keeps the freshest samples and discards the oldest
pub struct Channel<T: Message>{
    name: &'static str,
    queue: VecDeque<(T, u64)>,
    capacity: usize,
    write_epoch: u64, //incremented on every publish
}

impl<T: Message> Channel<T>{
    pub fn new(name: &'static str, capacity: usize) -> Self{
        assert!(capacity > 0, "channel capacity must be greater than 0");
        Channel{
            name,
            queue: VecDeque::with_capacity(capacity),
            capacity,
            write_epoch: 0,
        }
    }

    pub fn name(&self) -> &'static str{
        self.name
    }

    //publish a message, returns its epoch
    pub fn publish(&mut self, msg: T) -> u64{
        if self.queue.len() == self.capacity{
            //freshness bias: discard oldest
            self.queue.pop_front();
        }
        self.write_epoch += 1;
        self.queue.push_back((msg, self.write_epoch));
        self.write_epoch
    }

    //pop the oldest message (FIFO order)
    pub fn try_receive(&mut self) -> Option<T>{
        self.queue.pop_front().map(|(msg, _)| msg)
    }

    //look at the newest message without consuming it
    pub fn peek_latest(&self) -> Option<(&T, u64)>{
        self.queue.back().map(|(msg, epoch)| (msg, *epoch))
    }

    //epoch of the last publish (0 before anything was published)
    pub fn latest_epoch(&self) -> u64{
        self.write_epoch
    }

    pub fn len(&self) -> usize{
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool{
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize{
        self.capacity
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_publish_receive_fifo(){
        let mut ch: Channel<i32> = Channel::new("/test", 5);

        ch.publish(10);
        ch.publish(20);
        ch.publish(30);

        assert_eq!(ch.try_receive(), Some(10));
        assert_eq!(ch.try_receive(), Some(20));
        assert_eq!(ch.try_receive(), Some(30));
        assert_eq!(ch.try_receive(), None);
    }

    #[test]
    fn test_epoch_increment(){
        let mut ch: Channel<i32> = Channel::new("/test", 5);

        let e1 = ch.publish(10);
        let e2 = ch.publish(20);

        assert_eq!(e1, 1);
        assert_eq!(e2, 2);
        assert_eq!(ch.latest_epoch(), 2);
    }

    #[test]
    fn test_overflow_discards_oldest(){
        let mut ch: Channel<i32> = Channel::new("/test", 3);

        ch.publish(1);
        ch.publish(2);
        ch.publish(3);
        ch.publish(4); //overflow: discard 1

        assert_eq!(ch.len(), 3);
        assert_eq!(ch.try_receive(), Some(2));
        assert_eq!(ch.try_receive(), Some(3));
        assert_eq!(ch.try_receive(), Some(4));
        assert_eq!(ch.try_receive(), None);
    }

    #[test]
    fn test_peek_latest(){
        let mut ch: Channel<i32> = Channel::new("/test", 5);

        ch.publish(10);
        ch.publish(20);

        let (val, epoch) = ch.peek_latest().unwrap();
        assert_eq!(*val, 20);
        assert_eq!(epoch, 2);

        //peek doesn't consume
        assert_eq!(ch.len(), 2);
        assert_eq!(ch.name(), "/test");
    }

    #[test]
    fn test_epoch_survives_overflow(){
        let mut ch: Channel<i32> = Channel::new("/test", 2);

        ch.publish(1);
        ch.publish(2);
        let e3 = ch.publish(3);

        //epochs keep counting even when slots are discarded
        assert_eq!(e3, 3);
        let (val, epoch) = ch.peek_latest().unwrap();
        assert_eq!(*val, 3);
        assert_eq!(epoch, 3);
    }
}
